use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::AppError;

/// The authenticated caller for the device-token API.
#[derive(Debug, Clone, Copy)]
pub struct UserId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UserId>()
            .copied()
            .ok_or(AppError::Unauthorized)
    }
}

/// Bearer-token auth for the REST surface; tokens come from the same
/// external provider the hub validates against.
pub async fn auth_middleware(
    mut req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<axum::response::Response, AppError> {
    let token = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    let token_data = auth_core::validate_token(token).map_err(|_| AppError::Unauthorized)?;
    let user_id = token_data
        .claims
        .user_id()
        .map_err(|_| AppError::Unauthorized)?;

    req.extensions_mut().insert(UserId(user_id));
    Ok(next.run(req).await)
}
