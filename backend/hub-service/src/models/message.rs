use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MessageRecord {
    pub id: Uuid,
    pub group_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub client_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Wire shape for message responses and realtime events. History rows carry
/// the joined sender name; realtime events do not (clients substitute a
/// placeholder).
#[derive(Debug, Clone, Serialize)]
pub struct MessageDto {
    pub id: Uuid,
    pub group_id: Uuid,
    pub sender_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ref: Option<String>,
    pub created_at: String,
}

impl MessageDto {
    pub fn from_record(record: MessageRecord, sender_name: Option<String>) -> Self {
        Self {
            id: record.id,
            group_id: record.group_id,
            sender_id: record.sender_id,
            sender_name,
            content: record.content,
            client_ref: record.client_ref,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}
