/// Device token management handlers
use axum::{extract::State, http::StatusCode, Json};
use hub_fcm_shared::FcmClient;
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;
use crate::middleware::UserId;
use crate::models::{DeviceToken, Platform};
use crate::services::DeviceTokenService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterDevicePayload {
    pub token: String,
    pub platform: String, // "android", "ios", "web"
}

/// POST /api/v1/devices
pub async fn register_device(
    State(state): State<AppState>,
    user_id: UserId,
    Json(payload): Json<RegisterDevicePayload>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    if !FcmClient::validate_token_format(&payload.token) {
        return Err(AppError::BadRequest("malformed device token".into()));
    }
    let platform = Platform::parse(&payload.platform)
        .ok_or_else(|| AppError::BadRequest(format!("unknown platform: {}", payload.platform)))?;

    let device_id =
        DeviceTokenService::register(&state.db, user_id.0, &payload.token, platform).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "device_id": device_id, "success": true })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct UnregisterDevicePayload {
    pub token: String,
}

/// DELETE /api/v1/devices
pub async fn unregister_device(
    State(state): State<AppState>,
    user_id: UserId,
    Json(payload): Json<UnregisterDevicePayload>,
) -> Result<Json<serde_json::Value>, AppError> {
    DeviceTokenService::unregister(&state.db, user_id.0, &payload.token).await?;
    Ok(Json(json!({ "success": true })))
}

/// GET /api/v1/devices
pub async fn list_devices(
    State(state): State<AppState>,
    user_id: UserId,
) -> Result<Json<Vec<DeviceToken>>, AppError> {
    let devices = DeviceTokenService::user_devices(&state.db, user_id.0).await?;
    Ok(Json(devices))
}
