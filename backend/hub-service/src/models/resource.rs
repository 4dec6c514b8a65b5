use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Link,
    File,
    Text,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Link => "link",
            ResourceKind::File => "file",
            ResourceKind::Text => "text",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "link" => Some(ResourceKind::Link),
            "file" => Some(ResourceKind::File),
            "text" => Some(ResourceKind::Text),
            _ => None,
        }
    }
}

/// Vault visibility. Admin-only rows are invisible to regular members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Admin,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "public" => Some(Visibility::Public),
            "admin" => Some(Visibility::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ResourceRecord {
    pub id: Uuid,
    pub union_id: Uuid,
    pub title: String,
    pub description: String,
    pub kind: String,
    pub url: Option<String>,
    pub body: Option<String>,
    pub category: String,
    pub visibility: String,
    pub created_at: DateTime<Utc>,
}
