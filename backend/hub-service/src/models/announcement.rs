use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementCategory {
    Urgent,
    Event,
    General,
    Merch,
}

impl AnnouncementCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnouncementCategory::Urgent => "urgent",
            AnnouncementCategory::Event => "event",
            AnnouncementCategory::General => "general",
            AnnouncementCategory::Merch => "merch",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "urgent" => Some(AnnouncementCategory::Urgent),
            "event" => Some(AnnouncementCategory::Event),
            "general" => Some(AnnouncementCategory::General),
            "merch" => Some(AnnouncementCategory::Merch),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AnnouncementRecord {
    pub id: Uuid,
    pub union_id: Uuid,
    pub title: String,
    pub content: String,
    pub category: String,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
