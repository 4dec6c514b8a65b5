use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::guards::{UnionAdmin, UnionMember, User};
use crate::models::resource::{ResourceKind, ResourceRecord, Visibility};
use crate::state::AppState;

const SELECT_COLS: &str =
    "id, union_id, title, description, kind, url, body, category, visibility, created_at";

/// GET /unions/{id}/resources. Members see public rows; admins see all.
pub async fn list_resources(
    State(state): State<AppState>,
    user: User,
    Path(union_id): Path<Uuid>,
) -> Result<Json<Vec<ResourceRecord>>, AppError> {
    let member = UnionMember::verify(&state.db, user.id, union_id).await?;

    let rows = if member.is_admin() {
        sqlx::query_as::<_, ResourceRecord>(&format!(
            "SELECT {SELECT_COLS} FROM resources WHERE union_id = $1 ORDER BY created_at DESC"
        ))
        .bind(union_id)
        .fetch_all(&state.db)
        .await?
    } else {
        sqlx::query_as::<_, ResourceRecord>(&format!(
            "SELECT {SELECT_COLS} FROM resources \
             WHERE union_id = $1 AND visibility = 'public' ORDER BY created_at DESC"
        ))
        .bind(union_id)
        .fetch_all(&state.db)
        .await?
    };
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct CreateResourceRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub kind: String, // 'link', 'file', 'text'
    pub url: Option<String>,
    pub body: Option<String>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_visibility")]
    pub visibility: String,
}

fn default_category() -> String {
    "general".into()
}

fn default_visibility() -> String {
    "public".into()
}

fn validate_payload(kind: ResourceKind, url: &Option<String>, body: &Option<String>) -> Result<(), AppError> {
    match kind {
        ResourceKind::Link | ResourceKind::File => {
            if url.as_deref().map_or(true, |u| u.trim().is_empty()) {
                return Err(AppError::BadRequest("url is required for this kind".into()));
            }
        }
        ResourceKind::Text => {
            if body.as_deref().map_or(true, |b| b.trim().is_empty()) {
                return Err(AppError::BadRequest("body is required for text resources".into()));
            }
        }
    }
    Ok(())
}

/// POST /unions/{id}/resources (union admin)
pub async fn create_resource(
    State(state): State<AppState>,
    user: User,
    Path(union_id): Path<Uuid>,
    Json(body): Json<CreateResourceRequest>,
) -> Result<(StatusCode, Json<ResourceRecord>), AppError> {
    UnionAdmin::verify(&state.db, user.id, union_id).await?;

    let title = body.title.trim();
    if title.is_empty() {
        return Err(AppError::BadRequest("title is required".into()));
    }
    let kind = ResourceKind::parse(&body.kind)
        .ok_or_else(|| AppError::BadRequest(format!("unknown resource kind: {}", body.kind)))?;
    let visibility = Visibility::parse(&body.visibility)
        .ok_or_else(|| AppError::BadRequest(format!("unknown visibility: {}", body.visibility)))?;
    validate_payload(kind, &body.url, &body.body)?;

    let record = sqlx::query_as::<_, ResourceRecord>(&format!(
        "INSERT INTO resources (id, union_id, title, description, kind, url, body, category, visibility) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {SELECT_COLS}"
    ))
    .bind(Uuid::new_v4())
    .bind(union_id)
    .bind(title)
    .bind(&body.description)
    .bind(kind.as_str())
    .bind(&body.url)
    .bind(&body.body)
    .bind(&body.category)
    .bind(visibility.as_str())
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

#[derive(Deserialize)]
pub struct UpdateResourceRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub body: Option<String>,
    pub category: Option<String>,
    pub visibility: Option<String>,
}

/// PUT /resources/{id} (union admin)
pub async fn update_resource(
    State(state): State<AppState>,
    user: User,
    Path(resource_id): Path<Uuid>,
    Json(body): Json<UpdateResourceRequest>,
) -> Result<Json<ResourceRecord>, AppError> {
    let current = sqlx::query_as::<_, ResourceRecord>(&format!(
        "SELECT {SELECT_COLS} FROM resources WHERE id = $1"
    ))
    .bind(resource_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound)?;

    UnionAdmin::verify(&state.db, user.id, current.union_id).await?;

    let visibility = match body.visibility {
        Some(v) => Visibility::parse(&v)
            .ok_or_else(|| AppError::BadRequest(format!("unknown visibility: {v}")))?
            .as_str()
            .to_string(),
        None => current.visibility,
    };

    let record = sqlx::query_as::<_, ResourceRecord>(&format!(
        "UPDATE resources SET title = $1, description = $2, url = $3, body = $4, \
         category = $5, visibility = $6 WHERE id = $7 RETURNING {SELECT_COLS}"
    ))
    .bind(body.title.unwrap_or(current.title))
    .bind(body.description.unwrap_or(current.description))
    .bind(body.url.or(current.url))
    .bind(body.body.or(current.body))
    .bind(body.category.unwrap_or(current.category))
    .bind(&visibility)
    .bind(resource_id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(record))
}

/// DELETE /resources/{id} (union admin)
pub async fn delete_resource(
    State(state): State<AppState>,
    user: User,
    Path(resource_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let union_id: Uuid = sqlx::query_scalar("SELECT union_id FROM resources WHERE id = $1")
        .bind(resource_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound)?;

    UnionAdmin::verify(&state.db, user.id, union_id).await?;

    sqlx::query("DELETE FROM resources WHERE id = $1")
        .bind(resource_id)
        .execute(&state.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
