use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub port: u16,
    /// RSA public key of the external auth provider (validate-only).
    pub jwt_public_key_pem: String,
    /// Redis stream carrying message/announcement events to the
    /// notification service.
    pub events_stream: String,
}

impl Config {
    pub fn from_env() -> Result<Self, crate::error::AppError> {
        dotenv().ok();
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| crate::error::AppError::Config("DATABASE_URL missing".into()))?;
        let redis_url = env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".into());
        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        // Support reading the key from a file for container secrets mounts
        let jwt_public_key_pem = match env::var("JWT_PUBLIC_KEY_PEM") {
            Ok(pem) => pem,
            Err(_) => {
                let path = env::var("JWT_PUBLIC_KEY_FILE").map_err(|_| {
                    crate::error::AppError::Config("JWT_PUBLIC_KEY_PEM missing".into())
                })?;
                std::fs::read_to_string(path).map_err(|e| {
                    crate::error::AppError::Config(format!("read jwt pubkey file: {e}"))
                })?
            }
        };

        let events_stream =
            env::var("HUB_EVENTS_STREAM").unwrap_or_else(|_| "hub:events".into());

        Ok(Self {
            database_url,
            redis_url,
            port,
            jwt_public_key_pem,
            events_stream,
        })
    }

    #[cfg(test)]
    pub fn test_defaults() -> Self {
        Self {
            database_url: "postgres://localhost/test".into(),
            redis_url: "redis://127.0.0.1:6379/0".into(),
            port: 3000,
            jwt_public_key_pem: String::new(),
            events_stream: "hub:events".into(),
        }
    }
}
