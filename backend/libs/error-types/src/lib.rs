//! Shared HTTP error envelope for Union Hub services.
//!
//! Every handler failure, in every service, serializes to this one shape so
//! clients can branch on `error_type`/`code` without per-service parsing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// JSON body returned for every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short human title, e.g. "Forbidden"
    pub error: String,
    /// Detail message safe to show the user
    pub message: String,
    /// HTTP status code, duplicated in the body
    pub status: u16,
    /// Coarse classification, e.g. "authorization_error"
    pub error_type: String,
    /// Stable machine code, e.g. "NOT_A_MEMBER"
    pub code: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str, status: u16, error_type: &str, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            status,
            error_type: error_type.to_string(),
            code: code.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Stable machine-readable error codes shared across services.
pub mod error_codes {
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
    pub const NOT_A_MEMBER: &str = "NOT_A_MEMBER";
    pub const ADMIN_REQUIRED: &str = "ADMIN_REQUIRED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const DUPLICATE_INVITE_CODE: &str = "DUPLICATE_INVITE_CODE";
    pub const USER_BANNED: &str = "USER_BANNED";
    pub const CONFLICT: &str = "CONFLICT";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_serializes_all_fields() {
        let body = ErrorResponse::new(
            "Forbidden",
            "not a member of this union",
            403,
            "authorization_error",
            error_codes::NOT_A_MEMBER,
        );
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], 403);
        assert_eq!(json["code"], "NOT_A_MEMBER");
        assert_eq!(json["error_type"], "authorization_error");
    }
}
