use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
    Web,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
            Platform::Web => "web",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "android" => Some(Platform::Android),
            "ios" => Some(Platform::Ios),
            "web" => Some(Platform::Web),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DeviceToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub platform: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

/// One entry from the hub event stream, already decoded from its
/// field/value pairs.
#[derive(Debug, Clone, PartialEq)]
pub enum HubEvent {
    Message {
        union_id: Uuid,
        group_id: Uuid,
        message_id: Uuid,
        sender_id: Uuid,
        preview: String,
    },
    Announcement {
        union_id: Uuid,
        announcement_id: Uuid,
        title: String,
    },
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum EventParseError {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("field {0} is not a UUID")]
    BadUuid(&'static str),

    #[error("unknown event kind: {0}")]
    UnknownKind(String),
}

fn field<'a>(
    fields: &'a HashMap<String, String>,
    name: &'static str,
) -> Result<&'a str, EventParseError> {
    fields
        .get(name)
        .map(|s| s.as_str())
        .ok_or(EventParseError::MissingField(name))
}

fn uuid_field(
    fields: &HashMap<String, String>,
    name: &'static str,
) -> Result<Uuid, EventParseError> {
    Uuid::parse_str(field(fields, name)?).map_err(|_| EventParseError::BadUuid(name))
}

impl HubEvent {
    /// Decode a stream entry. Unknown kinds and malformed fields are parse
    /// errors; the consumer acks and drops those (poison tolerance).
    pub fn parse(fields: &HashMap<String, String>) -> Result<Self, EventParseError> {
        match field(fields, "kind")? {
            "message" => Ok(HubEvent::Message {
                union_id: uuid_field(fields, "union_id")?,
                group_id: uuid_field(fields, "group_id")?,
                message_id: uuid_field(fields, "message_id")?,
                sender_id: uuid_field(fields, "sender_id")?,
                preview: field(fields, "preview")?.to_string(),
            }),
            "announcement" => Ok(HubEvent::Announcement {
                union_id: uuid_field(fields, "union_id")?,
                announcement_id: uuid_field(fields, "announcement_id")?,
                title: field(fields, "title")?.to_string(),
            }),
            other => Err(EventParseError::UnknownKind(other.to_string())),
        }
    }

    pub fn union_id(&self) -> Uuid {
        match self {
            HubEvent::Message { union_id, .. } => *union_id,
            HubEvent::Announcement { union_id, .. } => *union_id,
        }
    }

    /// Sender to exclude from the fan-out (message events only).
    pub fn excluded_sender(&self) -> Option<Uuid> {
        match self {
            HubEvent::Message { sender_id, .. } => Some(*sender_id),
            HubEvent::Announcement { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_fields() -> HashMap<String, String> {
        let mut f = HashMap::new();
        f.insert("kind".into(), "message".into());
        f.insert("union_id".into(), Uuid::new_v4().to_string());
        f.insert("group_id".into(), Uuid::new_v4().to_string());
        f.insert("message_id".into(), Uuid::new_v4().to_string());
        f.insert("sender_id".into(), Uuid::new_v4().to_string());
        f.insert("preview".into(), "hello".into());
        f
    }

    #[test]
    fn parses_message_events() {
        let event = HubEvent::parse(&message_fields()).unwrap();
        assert!(matches!(event, HubEvent::Message { .. }));
        assert!(event.excluded_sender().is_some());
    }

    #[test]
    fn announcement_has_no_excluded_sender() {
        let mut f = HashMap::new();
        f.insert("kind".into(), "announcement".into());
        f.insert("union_id".into(), Uuid::new_v4().to_string());
        f.insert("announcement_id".into(), Uuid::new_v4().to_string());
        f.insert("title".into(), "AGM".into());

        let event = HubEvent::parse(&f).unwrap();
        assert_eq!(event.excluded_sender(), None);
    }

    #[test]
    fn unknown_kind_is_a_parse_error() {
        let mut f = message_fields();
        f.insert("kind".into(), "poll".into());
        assert_eq!(
            HubEvent::parse(&f),
            Err(EventParseError::UnknownKind("poll".into()))
        );
    }

    #[test]
    fn missing_field_is_a_parse_error() {
        let mut f = message_fields();
        f.remove("group_id");
        assert_eq!(
            HubEvent::parse(&f),
            Err(EventParseError::MissingField("group_id"))
        );
    }
}
