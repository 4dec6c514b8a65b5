use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupType {
    /// Readable and writable by every union member.
    Public,
    /// Requires a group_members row.
    Private,
    /// Readable by everyone, writable by union admins only.
    Announcement,
}

impl GroupType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupType::Public => "public",
            GroupType::Private => "private",
            GroupType::Announcement => "announcement",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "public" => Some(GroupType::Public),
            "private" => Some(GroupType::Private),
            "announcement" => Some(GroupType::Announcement),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct GroupRecord {
    pub id: Uuid,
    pub union_id: Uuid,
    pub name: String,
    pub group_type: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_type_round_trips() {
        for t in [GroupType::Public, GroupType::Private, GroupType::Announcement] {
            assert_eq!(GroupType::parse(t.as_str()), Some(t));
        }
        assert_eq!(GroupType::parse("direct"), None);
    }
}
