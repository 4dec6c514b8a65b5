use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::guards::{UnionAdmin, UnionMember, User};
use crate::models::report::{ReportRecord, ReportStatus};
use crate::state::AppState;

const SELECT_COLS: &str =
    "id, union_id, reported_user_id, content_ref, reason, status, created_by, created_at";

#[derive(Deserialize)]
pub struct CreateReportRequest {
    pub reported_user_id: Uuid,
    #[serde(default)]
    pub content_ref: String,
    pub reason: String,
}

/// POST /unions/{id}/reports. Any member can file one.
pub async fn create_report(
    State(state): State<AppState>,
    user: User,
    Path(union_id): Path<Uuid>,
    Json(body): Json<CreateReportRequest>,
) -> Result<(StatusCode, Json<ReportRecord>), AppError> {
    UnionMember::verify(&state.db, user.id, union_id).await?;

    if body.reason.trim().is_empty() {
        return Err(AppError::BadRequest("a reason is required".into()));
    }

    let record = sqlx::query_as::<_, ReportRecord>(&format!(
        "INSERT INTO reports (id, union_id, reported_user_id, content_ref, reason, status, created_by) \
         VALUES ($1, $2, $3, $4, $5, 'pending', $6) RETURNING {SELECT_COLS}"
    ))
    .bind(Uuid::new_v4())
    .bind(union_id)
    .bind(body.reported_user_id)
    .bind(&body.content_ref)
    .bind(body.reason.trim())
    .bind(user.id)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

#[derive(Deserialize)]
pub struct ListReportsParams {
    pub status: Option<String>,
}

/// GET /unions/{id}/reports (union admin)
pub async fn list_reports(
    State(state): State<AppState>,
    user: User,
    Path(union_id): Path<Uuid>,
    Query(params): Query<ListReportsParams>,
) -> Result<Json<Vec<ReportRecord>>, AppError> {
    UnionAdmin::verify(&state.db, user.id, union_id).await?;

    let rows = match params.status {
        Some(status) => {
            ReportStatus::parse(&status)
                .ok_or_else(|| AppError::BadRequest(format!("unknown status: {status}")))?;
            sqlx::query_as::<_, ReportRecord>(&format!(
                "SELECT {SELECT_COLS} FROM reports \
                 WHERE union_id = $1 AND status = $2 ORDER BY created_at DESC"
            ))
            .bind(union_id)
            .bind(&status)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as::<_, ReportRecord>(&format!(
                "SELECT {SELECT_COLS} FROM reports WHERE union_id = $1 ORDER BY created_at DESC"
            ))
            .bind(union_id)
            .fetch_all(&state.db)
            .await?
        }
    };
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct ResolveReportRequest {
    pub status: String, // 'resolved' or 'dismissed'
}

/// PATCH /reports/{id} (union admin): pending → resolved | dismissed.
pub async fn resolve_report(
    State(state): State<AppState>,
    user: User,
    Path(report_id): Path<Uuid>,
    Json(body): Json<ResolveReportRequest>,
) -> Result<Json<ReportRecord>, AppError> {
    let current = sqlx::query_as::<_, ReportRecord>(&format!(
        "SELECT {SELECT_COLS} FROM reports WHERE id = $1"
    ))
    .bind(report_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound)?;

    UnionAdmin::verify(&state.db, user.id, current.union_id).await?;

    let next = ReportStatus::parse(&body.status)
        .ok_or_else(|| AppError::BadRequest(format!("unknown status: {}", body.status)))?;
    if next == ReportStatus::Pending {
        return Err(AppError::BadRequest("reports cannot be re-opened".into()));
    }
    if current.status != ReportStatus::Pending.as_str() {
        return Err(AppError::Conflict("report is already settled".into()));
    }

    let record = sqlx::query_as::<_, ReportRecord>(&format!(
        "UPDATE reports SET status = $1 WHERE id = $2 RETURNING {SELECT_COLS}"
    ))
    .bind(next.as_str())
    .bind(report_id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(record))
}
