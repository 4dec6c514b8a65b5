use thiserror::Error;

/// FCM client error types
#[derive(Error, Debug)]
pub enum FcmError {
    #[error("failed to parse service account private key: {0}")]
    KeyParse(String),

    #[error("failed to encode OAuth2 assertion: {0}")]
    JwtEncode(String),

    #[error("token request failed: {0}")]
    TokenRequest(String),

    #[error("failed to parse token response: {0}")]
    TokenParse(String),

    #[error("FCM send request failed: {0}")]
    SendRequest(String),

    #[error("failed to parse FCM response: {0}")]
    ResponseParse(String),

    #[error("FCM API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("invalid device token")]
    InvalidToken,
}

impl FcmError {
    /// Transport failures and server-side throttling are worth another
    /// attempt; 4xx API rejections are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            FcmError::SendRequest(_) | FcmError::TokenRequest(_) => true,
            FcmError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_are_retryable() {
        assert!(FcmError::SendRequest("connection reset".into()).is_retryable());
        assert!(FcmError::Api { status: 503, body: String::new() }.is_retryable());
        assert!(FcmError::Api { status: 429, body: String::new() }.is_retryable());
    }

    #[test]
    fn rejections_are_permanent() {
        assert!(!FcmError::Api { status: 404, body: String::new() }.is_retryable());
        assert!(!FcmError::InvalidToken.is_retryable());
    }
}
