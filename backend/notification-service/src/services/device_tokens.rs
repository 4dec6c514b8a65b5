use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{DeviceToken, Platform};

pub struct DeviceTokenService;

impl DeviceTokenService {
    /// Register or re-activate a device token. Upsert on (user_id, token) so
    /// a reinstalled app re-registering is a refresh, not a duplicate.
    pub async fn register(
        db: &PgPool,
        user_id: Uuid,
        token: &str,
        platform: Platform,
    ) -> Result<Uuid, AppError> {
        let row = sqlx::query(
            "INSERT INTO device_tokens (id, user_id, token, platform, is_active, created_at) \
             VALUES ($1, $2, $3, $4, TRUE, $5) \
             ON CONFLICT (user_id, token) DO UPDATE \
             SET is_active = TRUE, platform = EXCLUDED.platform, last_used_at = $5 \
             RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(token)
        .bind(platform.as_str())
        .bind(Utc::now())
        .fetch_one(db)
        .await?;

        let id: Uuid = row.get("id");
        tracing::info!(user_id = %user_id, "registered device token");
        Ok(id)
    }

    /// Deactivate rather than delete, so delivery history stays joinable.
    pub async fn unregister(db: &PgPool, user_id: Uuid, token: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE device_tokens SET is_active = FALSE WHERE user_id = $1 AND token = $2")
            .bind(user_id)
            .bind(token)
            .execute(db)
            .await?;

        tracing::debug!(user_id = %user_id, "unregistered device token");
        Ok(())
    }

    pub async fn user_devices(db: &PgPool, user_id: Uuid) -> Result<Vec<DeviceToken>, AppError> {
        let rows = sqlx::query_as::<_, DeviceToken>(
            "SELECT id, user_id, token, platform, is_active, created_at, last_used_at \
             FROM device_tokens WHERE user_id = $1 AND is_active",
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
