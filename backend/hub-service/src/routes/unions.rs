use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::guards::{UnionAdmin, User};
use crate::models::union::{UnionRecord, UnionSummary};
use crate::routes::profiles::ensure_profile;
use crate::services::union_service::UnionService;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateUnionRequest {
    pub name: String,
    pub invite_code: String,
}

/// POST /unions
///
/// Onboarding path. The creator ends up in the member set with the admin
/// role, atomically.
pub async fn create_union(
    State(state): State<AppState>,
    user: User,
    Json(body): Json<CreateUnionRequest>,
) -> Result<(StatusCode, Json<UnionRecord>), AppError> {
    let name = body.name.trim();
    let invite_code = body.invite_code.trim();
    if name.is_empty() || invite_code.is_empty() {
        return Err(AppError::BadRequest(
            "name and invite code are required".into(),
        ));
    }

    ensure_profile(&state.db, &user).await?;
    let union = UnionService::create_with_admin(&state.db, name, invite_code, user.id).await?;
    Ok((StatusCode::CREATED, Json(union)))
}

/// GET /unions
///
/// The unions whose member set contains the caller, in query order. The
/// client resolver consumes this verbatim.
pub async fn my_unions(
    State(state): State<AppState>,
    user: User,
) -> Result<Json<Vec<UnionSummary>>, AppError> {
    let unions = UnionService::unions_for_user(&state.db, user.id).await?;
    Ok(Json(unions))
}

#[derive(Deserialize)]
pub struct JoinUnionRequest {
    pub invite_code: String,
}

/// POST /unions/join
pub async fn join_union(
    State(state): State<AppState>,
    user: User,
    Json(body): Json<JoinUnionRequest>,
) -> Result<Json<UnionRecord>, AppError> {
    ensure_profile(&state.db, &user).await?;
    let union = UnionService::join_by_code(&state.db, body.invite_code.trim(), user.id).await?;
    Ok(Json(union))
}

/// POST /unions/{id}/leave
pub async fn leave_union(
    State(state): State<AppState>,
    user: User,
    Path(union_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    UnionService::leave(&state.db, union_id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct UpdateMemberRoleRequest {
    pub role: String, // 'admin', 'member'
}

/// PATCH /unions/{id}/members/{user_id} (union admin): role change.
pub async fn update_member_role(
    State(state): State<AppState>,
    user: User,
    Path((union_id, member_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateMemberRoleRequest>,
) -> Result<StatusCode, AppError> {
    UnionAdmin::verify(&state.db, user.id, union_id).await?;

    if body.role != "admin" && body.role != "member" {
        return Err(AppError::BadRequest("invalid role".into()));
    }

    let updated = sqlx::query(
        "UPDATE union_members SET role = $1 WHERE union_id = $2 AND user_id = $3",
    )
    .bind(&body.role)
    .bind(union_id)
    .bind(member_id)
    .execute(&state.db)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
