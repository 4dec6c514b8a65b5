use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::guards::{UnionAdmin, UnionMember, User};
use crate::models::announcement::{AnnouncementCategory, AnnouncementRecord};
use crate::services::events;
use crate::state::AppState;

const SELECT_COLS: &str =
    "id, union_id, title, content, category, author_id, created_at, updated_at";

/// GET /unions/{id}/announcements
pub async fn list_announcements(
    State(state): State<AppState>,
    user: User,
    Path(union_id): Path<Uuid>,
) -> Result<Json<Vec<AnnouncementRecord>>, AppError> {
    UnionMember::verify(&state.db, user.id, union_id).await?;

    let rows = sqlx::query_as::<_, AnnouncementRecord>(&format!(
        "SELECT {SELECT_COLS} FROM announcements WHERE union_id = $1 ORDER BY created_at DESC"
    ))
    .bind(union_id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct CreateAnnouncementRequest {
    pub title: String,
    pub content: String,
    pub category: String, // 'urgent', 'event', 'general', 'merch'
}

/// POST /unions/{id}/announcements (union admin). Creation feeds the push
/// fan-out stream; no sender exclusion for announcements.
pub async fn create_announcement(
    State(state): State<AppState>,
    user: User,
    Path(union_id): Path<Uuid>,
    Json(body): Json<CreateAnnouncementRequest>,
) -> Result<(StatusCode, Json<AnnouncementRecord>), AppError> {
    UnionAdmin::verify(&state.db, user.id, union_id).await?;

    let title = body.title.trim();
    if title.is_empty() || body.content.trim().is_empty() {
        return Err(AppError::BadRequest("title and content are required".into()));
    }
    let category = AnnouncementCategory::parse(&body.category)
        .ok_or_else(|| AppError::BadRequest(format!("unknown category: {}", body.category)))?;

    let record = sqlx::query_as::<_, AnnouncementRecord>(&format!(
        "INSERT INTO announcements (id, union_id, title, content, category, author_id) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {SELECT_COLS}"
    ))
    .bind(Uuid::new_v4())
    .bind(union_id)
    .bind(title)
    .bind(body.content.trim())
    .bind(category.as_str())
    .bind(user.id)
    .fetch_one(&state.db)
    .await?;

    if let Err(e) = events::publish_announcement_event(
        &state.redis,
        &state.config.events_stream,
        union_id,
        record.id,
        &record.title,
    )
    .await
    {
        tracing::warn!(error = %e, announcement_id = %record.id, "failed to enqueue push event");
    }

    Ok((StatusCode::CREATED, Json(record)))
}

#[derive(Deserialize)]
pub struct UpdateAnnouncementRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
}

/// PUT /announcements/{id} (union admin)
pub async fn update_announcement(
    State(state): State<AppState>,
    user: User,
    Path(announcement_id): Path<Uuid>,
    Json(body): Json<UpdateAnnouncementRequest>,
) -> Result<Json<AnnouncementRecord>, AppError> {
    let current = sqlx::query_as::<_, AnnouncementRecord>(&format!(
        "SELECT {SELECT_COLS} FROM announcements WHERE id = $1"
    ))
    .bind(announcement_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound)?;

    UnionAdmin::verify(&state.db, user.id, current.union_id).await?;

    let title = body.title.unwrap_or(current.title);
    let content = body.content.unwrap_or(current.content);
    let category = match body.category {
        Some(c) => AnnouncementCategory::parse(&c)
            .ok_or_else(|| AppError::BadRequest(format!("unknown category: {c}")))?
            .as_str()
            .to_string(),
        None => current.category,
    };

    let record = sqlx::query_as::<_, AnnouncementRecord>(&format!(
        "UPDATE announcements SET title = $1, content = $2, category = $3, updated_at = NOW() \
         WHERE id = $4 RETURNING {SELECT_COLS}"
    ))
    .bind(&title)
    .bind(&content)
    .bind(&category)
    .bind(announcement_id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(record))
}

/// DELETE /announcements/{id} (union admin)
pub async fn delete_announcement(
    State(state): State<AppState>,
    user: User,
    Path(announcement_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let union_id: Uuid =
        sqlx::query_scalar("SELECT union_id FROM announcements WHERE id = $1")
            .bind(announcement_id)
            .fetch_optional(&state.db)
            .await?
            .ok_or(AppError::NotFound)?;

    UnionAdmin::verify(&state.db, user.id, union_id).await?;

    sqlx::query("DELETE FROM announcements WHERE id = $1")
        .bind(announcement_id)
        .execute(&state.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
