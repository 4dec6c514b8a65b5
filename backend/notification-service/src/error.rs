use axum::{http::StatusCode, response::IntoResponse, Json};
use error_types::{error_codes, ErrorResponse};
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("server start failure: {0}")]
    StartServer(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("event stream error: {0}")]
    Stream(String),

    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::BadRequest(_) => 400,
            AppError::Unauthorized => 401,
            AppError::NotFound => 404,
            _ => 500,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let (error_type, code) = match &self {
            AppError::BadRequest(_) => ("validation_error", error_codes::INVALID_REQUEST),
            AppError::Unauthorized => ("authentication_error", error_codes::INVALID_CREDENTIALS),
            AppError::NotFound => ("not_found_error", error_codes::NOT_FOUND),
            AppError::Database(_) => ("server_error", error_codes::DATABASE_ERROR),
            _ => ("server_error", error_codes::INTERNAL_SERVER_ERROR),
        };

        let message = match &self {
            AppError::Database(e) => {
                tracing::error!(error = %e, "database failure");
                "an internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse::new(
            match status {
                StatusCode::BAD_REQUEST => "Bad Request",
                StatusCode::UNAUTHORIZED => "Unauthorized",
                StatusCode::NOT_FOUND => "Not Found",
                _ => "Internal Server Error",
            },
            &message,
            status.as_u16(),
            error_type,
            code,
        );

        (status, Json(body)).into_response()
    }
}
