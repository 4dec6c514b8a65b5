use jsonwebtoken::{decode, Algorithm, DecodingKey, TokenData, Validation};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// RS256 only, matching what the auth provider issues.
const JWT_ALGORITHM: Algorithm = Algorithm::RS256;

/// Claims carried by the provider's session tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Email address
    pub email: String,
    /// Display name
    #[serde(default)]
    pub name: String,
}

impl Claims {
    /// Parse the subject as a user id.
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|_| AuthError::MalformedSubject)
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to parse RSA public key: {0}")]
    KeyParse(String),

    #[error("JWT decoding key already initialized")]
    AlreadyInitialized,

    #[error("JWT decoding key not initialized")]
    NotInitialized,

    #[error("invalid token")]
    InvalidToken,

    #[error("token subject is not a UUID")]
    MalformedSubject,
}

static JWT_DECODING_KEY: OnceCell<DecodingKey> = OnceCell::new();

/// Load the auth provider's public key. Must be called once during startup,
/// before any token validation.
pub fn initialize_validation(public_key_pem: &str) -> Result<(), AuthError> {
    let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
        .map_err(|e| AuthError::KeyParse(e.to_string()))?;

    JWT_DECODING_KEY
        .set(decoding_key)
        .map_err(|_| AuthError::AlreadyInitialized)
}

/// Validate a session token and return its claims.
pub fn validate_token(token: &str) -> Result<TokenData<Claims>, AuthError> {
    let key = JWT_DECODING_KEY.get().ok_or(AuthError::NotInitialized)?;

    let mut validation = Validation::new(JWT_ALGORITHM);
    validation.validate_exp = true;

    decode::<Claims>(token, key, &validation).map_err(|_| AuthError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_before_initialization() {
        // The global key is process-wide; an arbitrary token must not pass
        // before (or without) a key being installed in this test binary.
        let result = validate_token("not-a-real-token");
        assert!(result.is_err());
    }

    #[test]
    fn malformed_subject_is_rejected() {
        let claims = Claims {
            sub: "board-7".into(),
            iat: 0,
            exp: i64::MAX,
            email: "member@example.org".into(),
            name: "Member".into(),
        };
        assert!(matches!(claims.user_id(), Err(AuthError::MalformedSubject)));
    }
}
