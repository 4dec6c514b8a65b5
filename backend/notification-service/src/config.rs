use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub port: u16,
    pub jwt_public_key_pem: String,
    /// Stream the hub produces message/announcement events onto.
    pub events_stream: String,
    /// Consumer group name; every service instance shares it.
    pub consumer_group: String,
    /// Path to the Firebase service account JSON. Absent means push
    /// delivery is disabled (events are consumed and dropped with a log).
    pub fcm_credentials_path: Option<String>,
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
            .unwrap_or(3001);

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
        let consumer_group =
            env::var("EVENTS_CONSUMER_GROUP").unwrap_or_else(|_| "notification-service".into());

        let fcm_credentials_path = env::var("FCM_CREDENTIALS_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty());

        Ok(Self {
            database_url,
            redis_url,
            port,
            jwt_public_key_pem,
            events_stream,
            consumer_group,
            fcm_credentials_path,
        })
    }

    #[cfg(test)]
    pub fn test_defaults() -> Self {
        Self {
            database_url: "postgres://localhost/test".into(),
            redis_url: "redis://127.0.0.1:6379/0".into(),
            port: 3001,
            jwt_public_key_pem: String::new(),
            events_stream: "hub:events".into(),
            consumer_group: "notification-service".into(),
            fcm_credentials_path: None,
        }
    }
}
