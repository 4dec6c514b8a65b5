use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UnionRecord {
    pub id: Uuid,
    pub name: String,
    /// Admin-chosen join key, unique across the site.
    pub invite_code: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// What the membership resolver on the client consumes: id + name, in query
/// order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UnionSummary {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UnionMemberRow {
    pub union_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub joined_at: DateTime<Utc>,
}
