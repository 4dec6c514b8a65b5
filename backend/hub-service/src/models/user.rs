use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Site-wide role. Union-scoped roles live on the membership row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Member,
    Board,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Member => "member",
            UserRole::Board => "board",
            UserRole::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "member" => Some(UserRole::Member),
            "board" => Some(UserRole::Board),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub tier: String,
    pub banned: bool,
    pub member_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The member identity card shown in the app.
#[derive(Debug, Clone, Serialize)]
pub struct MemberCard {
    pub display_name: String,
    pub tier: String,
    pub member_number: Option<String>,
    pub member_since_year: i32,
}

impl MemberCard {
    pub fn from_record(user: &UserRecord) -> Self {
        use chrono::Datelike;
        Self {
            display_name: user.display_name.clone(),
            tier: user.tier.clone(),
            member_number: user.member_number.clone(),
            member_since_year: user.created_at.year(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips() {
        for role in [UserRole::Member, UserRole::Board, UserRole::Admin] {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::parse("owner"), None);
    }
}
