use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::guards::{GroupMember, UnionAdmin, User};
use crate::models::message::MessageDto;
use crate::services::{events, message_service::MessageService};
use crate::state::AppState;
use crate::websocket::message_types::WsOutboundEvent;
use crate::websocket::pubsub;

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
    /// Client temporary id, echoed back for optimistic-send reconciliation.
    pub client_ref: Option<String>,
}

/// POST /groups/{id}/messages
///
/// Returns the authoritative record. The realtime event and the push-fanout
/// stream entry both go out before the response; neither can fail the send.
pub async fn send_message(
    State(state): State<AppState>,
    user: User,
    Path(group_id): Path<Uuid>,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageDto>), AppError> {
    let member = GroupMember::verify(&state.db, user.id, group_id).await?;
    member.ensure_can_post()?;

    let content = body.content.trim();
    if content.is_empty() {
        return Err(AppError::BadRequest("message content cannot be empty".into()));
    }

    let record =
        MessageService::create(&state.db, group_id, user.id, content, body.client_ref.as_deref())
            .await?;

    // Realtime frame: no joined sender name, clients substitute their own
    // placeholder (the sender sees their own name locally).
    let event = WsOutboundEvent::NewMessage {
        group_id,
        message_id: record.id,
        sender_id: record.sender_id,
        content: record.content.clone(),
        client_ref: record.client_ref.clone(),
        created_at: record.created_at.to_rfc3339(),
    };
    if let Ok(payload) = serde_json::to_string(&event) {
        state
            .registry
            .broadcast(group_id, axum::extract::ws::Message::Text(payload.clone()))
            .await;
        let _ = pubsub::publish(&state.redis, group_id, &payload).await;
    }

    if let Err(e) = events::publish_message_event(
        &state.redis,
        &state.config.events_stream,
        member.union_id,
        group_id,
        record.id,
        record.sender_id,
        content,
    )
    .await
    {
        tracing::warn!(error = %e, message_id = %record.id, "failed to enqueue push event");
    }

    let dto = MessageDto::from_record(record, Some(user.display_name));
    Ok((StatusCode::CREATED, Json(dto)))
}

#[derive(Deserialize)]
pub struct HistoryParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /groups/{id}/messages
///
/// History with joined sender names, in (created_at, id) order.
pub async fn get_message_history(
    State(state): State<AppState>,
    user: User,
    Path(group_id): Path<Uuid>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<MessageDto>>, AppError> {
    let member = GroupMember::verify(&state.db, user.id, group_id).await?;
    member.ensure_can_read()?;

    let rows = MessageService::history(
        &state.db,
        group_id,
        params.limit.unwrap_or(100),
        params.offset.unwrap_or(0),
    )
    .await?;
    Ok(Json(rows))
}

/// DELETE /messages/{id}
///
/// Senders delete their own; union admins moderate anything in their union.
pub async fn delete_message(
    State(state): State<AppState>,
    user: User,
    Path(message_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let (sender_id, group_id) = MessageService::sender_and_group(&state.db, message_id).await?;

    if sender_id != user.id {
        let union_id: Uuid = sqlx::query_scalar("SELECT union_id FROM groups WHERE id = $1")
            .bind(group_id)
            .fetch_one(&state.db)
            .await?;
        UnionAdmin::verify(&state.db, user.id, union_id).await?;
    }

    MessageService::soft_delete(&state.db, message_id).await?;

    let event = WsOutboundEvent::MessageDeleted {
        group_id,
        message_id,
    };
    if let Ok(payload) = serde_json::to_string(&event) {
        state
            .registry
            .broadcast(group_id, axum::extract::ws::Message::Text(payload.clone()))
            .await;
        let _ = pubsub::publish(&state.redis, group_id, &payload).await;
    }

    Ok(StatusCode::NO_CONTENT)
}
