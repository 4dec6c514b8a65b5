//! Shared JWT validation for Union Hub services.
//!
//! Sessions are issued by the external auth provider; this repo never signs
//! user tokens. Services load the provider's RSA public key once at startup
//! and validate RS256 tokens against it. No symmetric fallback.

pub mod jwt;

pub use jwt::{initialize_validation, validate_token, Claims};
