use crate::error::AppError;
use axum::{http::StatusCode, response::IntoResponse, Json};
use error_types::{error_codes, ErrorResponse};

/// Map domain errors to HTTP responses
pub fn map_error(err: &AppError) -> (StatusCode, ErrorResponse) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let (error_type, code) = match err {
        AppError::BadRequest(_) => ("validation_error", error_codes::INVALID_REQUEST),
        AppError::Unauthorized => ("authentication_error", error_codes::INVALID_CREDENTIALS),
        AppError::Forbidden => ("authorization_error", error_codes::ADMIN_REQUIRED),
        AppError::NotFound => ("not_found_error", error_codes::NOT_FOUND),
        AppError::Conflict(_) => ("conflict_error", error_codes::CONFLICT),
        AppError::Config(_) | AppError::StartServer(_) => {
            ("server_error", error_codes::INTERNAL_SERVER_ERROR)
        }
        AppError::Database(_) => ("server_error", error_codes::DATABASE_ERROR),
        AppError::Internal => ("server_error", error_codes::INTERNAL_SERVER_ERROR),
    };

    // Database failures keep their detail in the logs, not the body.
    let message = match err {
        AppError::Database(e) => {
            tracing::error!(error = %e, "database failure");
            "an internal error occurred".to_string()
        }
        _ => err.to_string(),
    };
    let response = ErrorResponse::new(
        match status {
            StatusCode::BAD_REQUEST => "Bad Request",
            StatusCode::UNAUTHORIZED => "Unauthorized",
            StatusCode::FORBIDDEN => "Forbidden",
            StatusCode::NOT_FOUND => "Not Found",
            StatusCode::CONFLICT => "Conflict",
            StatusCode::INTERNAL_SERVER_ERROR => "Internal Server Error",
            _ => "Error",
        },
        &message,
        status.as_u16(),
        error_type,
        code,
    );

    (status, response)
}

pub fn into_response(err: AppError) -> impl IntoResponse {
    let (status, response) = map_error(&err);
    (status, Json(response))
}
