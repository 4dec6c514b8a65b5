use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::guards::{SiteAdmin, User};
use crate::models::user::{MemberCard, UserRecord, UserRole};
use crate::state::AppState;

/// First authenticated contact creates the profile row from the token
/// claims. Idempotent, so every entry point that needs the row may call it.
pub(crate) async fn ensure_profile(db: &PgPool, user: &User) -> Result<(), AppError> {
    let display_name = if user.display_name.is_empty() {
        user.email
            .split('@')
            .next()
            .unwrap_or("member")
            .to_string()
    } else {
        user.display_name.clone()
    };

    sqlx::query(
        "INSERT INTO users (id, email, display_name) VALUES ($1, $2, $3) \
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&display_name)
    .execute(db)
    .await?;
    Ok(())
}

async fn fetch_profile(db: &PgPool, user_id: Uuid) -> Result<UserRecord, AppError> {
    sqlx::query_as::<_, UserRecord>(
        "SELECT id, email, display_name, role, tier, banned, member_number, created_at \
         FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?
    .ok_or(AppError::NotFound)
}

/// GET /me
pub async fn get_me(
    State(state): State<AppState>,
    user: User,
) -> Result<Json<UserRecord>, AppError> {
    ensure_profile(&state.db, &user).await?;
    let record = fetch_profile(&state.db, user.id).await?;
    Ok(Json(record))
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: String,
}

/// PUT /me
pub async fn update_me(
    State(state): State<AppState>,
    user: User,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<UserRecord>, AppError> {
    let display_name = body.display_name.trim();
    if display_name.is_empty() {
        return Err(AppError::BadRequest("display name cannot be empty".into()));
    }

    ensure_profile(&state.db, &user).await?;
    sqlx::query("UPDATE users SET display_name = $1 WHERE id = $2")
        .bind(display_name)
        .bind(user.id)
        .execute(&state.db)
        .await?;

    let record = fetch_profile(&state.db, user.id).await?;
    Ok(Json(record))
}

/// GET /me/card: the member identity card.
pub async fn member_card(
    State(state): State<AppState>,
    user: User,
) -> Result<Json<MemberCard>, AppError> {
    ensure_profile(&state.db, &user).await?;
    let record = fetch_profile(&state.db, user.id).await?;
    Ok(Json(MemberCard::from_record(&record)))
}

/// GET /users (site admin)
pub async fn list_users(
    State(state): State<AppState>,
    user: User,
) -> Result<Json<Vec<UserRecord>>, AppError> {
    SiteAdmin::verify(&state.db, user.id).await?;

    let users = sqlx::query_as::<_, UserRecord>(
        "SELECT id, email, display_name, role, tier, banned, member_number, created_at \
         FROM users ORDER BY created_at ASC",
    )
    .fetch_all(&state.db)
    .await?;
    Ok(Json(users))
}

#[derive(Deserialize)]
pub struct AdminPatchUserRequest {
    pub role: Option<String>,
    pub banned: Option<bool>,
    pub member_number: Option<String>,
}

/// PATCH /users/{id} (site admin): role, ban flag, verified member number.
pub async fn patch_user(
    State(state): State<AppState>,
    user: User,
    Path(target_id): Path<Uuid>,
    Json(body): Json<AdminPatchUserRequest>,
) -> Result<Json<UserRecord>, AppError> {
    SiteAdmin::verify(&state.db, user.id).await?;

    let current = fetch_profile(&state.db, target_id).await?;

    let role = match body.role {
        Some(role) => UserRole::parse(&role)
            .ok_or_else(|| AppError::BadRequest(format!("unknown role: {role}")))?
            .as_str()
            .to_string(),
        None => current.role,
    };
    let banned = body.banned.unwrap_or(current.banned);
    let member_number = body.member_number.or(current.member_number);

    sqlx::query("UPDATE users SET role = $1, banned = $2, member_number = $3 WHERE id = $4")
        .bind(&role)
        .bind(banned)
        .bind(&member_number)
        .bind(target_id)
        .execute(&state.db)
        .await?;

    let record = fetch_profile(&state.db, target_id).await?;
    Ok(Json(record))
}

/// DELETE /users/{id} (site admin). The only hard delete in the system.
pub async fn delete_user(
    State(state): State<AppState>,
    user: User,
    Path(target_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    SiteAdmin::verify(&state.db, user.id).await?;

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(target_id)
        .execute(&state.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
