use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::guards::{UnionAdmin, UnionMember, User};
use crate::models::group::{GroupRecord, GroupType};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    pub group_type: String, // 'public', 'private', 'announcement'
}

/// POST /unions/{id}/groups (union admin)
pub async fn create_group(
    State(state): State<AppState>,
    user: User,
    Path(union_id): Path<Uuid>,
    Json(body): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<GroupRecord>), AppError> {
    UnionAdmin::verify(&state.db, user.id, union_id).await?;

    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("group name is required".into()));
    }
    let group_type = GroupType::parse(&body.group_type)
        .ok_or_else(|| AppError::BadRequest(format!("unknown group type: {}", body.group_type)))?;

    let id = Uuid::new_v4();
    let group = sqlx::query_as::<_, GroupRecord>(
        "INSERT INTO groups (id, union_id, name, group_type) VALUES ($1, $2, $3, $4) \
         RETURNING id, union_id, name, group_type, created_at",
    )
    .bind(id)
    .bind(union_id)
    .bind(name)
    .bind(group_type.as_str())
    .fetch_one(&state.db)
    .await?;

    // The creating admin is in the group from the start
    sqlx::query(
        "INSERT INTO group_members (group_id, user_id) VALUES ($1, $2) \
         ON CONFLICT (group_id, user_id) DO NOTHING",
    )
    .bind(id)
    .bind(user.id)
    .execute(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(group)))
}

/// GET /unions/{id}/groups. Private groups appear only for their members.
pub async fn list_groups(
    State(state): State<AppState>,
    user: User,
    Path(union_id): Path<Uuid>,
) -> Result<Json<Vec<GroupRecord>>, AppError> {
    UnionMember::verify(&state.db, user.id, union_id).await?;

    let groups = sqlx::query_as::<_, GroupRecord>(
        "SELECT g.id, g.union_id, g.name, g.group_type, g.created_at \
         FROM groups g \
         WHERE g.union_id = $1 \
           AND (g.group_type <> 'private' OR EXISTS( \
               SELECT 1 FROM group_members gm \
               WHERE gm.group_id = g.id AND gm.user_id = $2)) \
         ORDER BY g.created_at ASC",
    )
    .bind(union_id)
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(groups))
}

#[derive(Deserialize)]
pub struct AddGroupMemberRequest {
    /// Defaults to the caller (self-join).
    pub user_id: Option<Uuid>,
}

/// POST /groups/{id}/members
///
/// Self-join for public groups; admins add anyone, including to private
/// groups.
pub async fn add_group_member(
    State(state): State<AppState>,
    user: User,
    Path(group_id): Path<Uuid>,
    Json(body): Json<AddGroupMemberRequest>,
) -> Result<StatusCode, AppError> {
    let group = sqlx::query_as::<_, GroupRecord>(
        "SELECT id, union_id, name, group_type, created_at FROM groups WHERE id = $1",
    )
    .bind(group_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound)?;

    let target = body.user_id.unwrap_or(user.id);
    let self_join = target == user.id && group.group_type == "public";

    if self_join {
        UnionMember::verify(&state.db, user.id, group.union_id).await?;
    } else {
        UnionAdmin::verify(&state.db, user.id, group.union_id).await?;
        // The target still has to be a union member
        UnionMember::verify(&state.db, target, group.union_id).await?;
    }

    sqlx::query(
        "INSERT INTO group_members (group_id, user_id) VALUES ($1, $2) \
         ON CONFLICT (group_id, user_id) DO NOTHING",
    )
    .bind(group_id)
    .bind(target)
    .execute(&state.db)
    .await?;

    Ok(StatusCode::CREATED)
}

/// DELETE /groups/{id}/members/{user_id}: self-removal or union admin.
pub async fn remove_group_member(
    State(state): State<AppState>,
    user: User,
    Path((group_id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    let union_id: Uuid = sqlx::query_scalar("SELECT union_id FROM groups WHERE id = $1")
        .bind(group_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound)?;

    if member_id != user.id {
        UnionAdmin::verify(&state.db, user.id, union_id).await?;
    }

    sqlx::query("DELETE FROM group_members WHERE group_id = $1 AND user_id = $2")
        .bind(group_id)
        .bind(member_id)
        .execute(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
