use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::HeaderMap,
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{error, warn};
use uuid::Uuid;

use crate::middleware::auth;
use crate::middleware::guards::GroupMember;
use crate::state::AppState;
use crate::websocket::message_types::{WsInboundEvent, WsOutboundEvent};

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub group_id: Uuid,
    /// Browsers cannot set headers on websocket connects; accept the token
    /// as a query parameter too.
    pub token: Option<String>,
}

fn token_for_ws(params: &WsParams, headers: &HeaderMap) -> Option<String> {
    params
        .token
        .clone()
        .or_else(|| auth::token_from_headers(headers))
}

pub async fn ws_handler(
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let identity = match token_for_ws(&params, &headers) {
        Some(token) => match auth::identity_from_token(&token) {
            Ok(identity) => identity,
            Err(_) => {
                warn!(group_id = %params.group_id, "websocket rejected: invalid token");
                return axum::http::StatusCode::UNAUTHORIZED.into_response();
            }
        },
        None => {
            warn!(group_id = %params.group_id, "websocket rejected: no token");
            return axum::http::StatusCode::UNAUTHORIZED.into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(state, params, identity.id, socket))
}

async fn handle_socket(state: AppState, params: WsParams, user_id: Uuid, mut socket: WebSocket) {
    // Membership gate before the first frame is exchanged.
    match GroupMember::verify(&state.db, user_id, params.group_id).await {
        Ok(member) if member.can_read() => {}
        Ok(_) | Err(_) => {
            warn!(user_id = %user_id, group_id = %params.group_id,
                "websocket closed: not a readable group for this user");
            let _ = socket.send(Message::Close(None)).await;
            return;
        }
    }

    let mut rx = state.registry.add_subscriber(params.group_id).await;
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            // Frames fanned out to this group
            maybe = rx.recv() => {
                match maybe {
                    Some(msg) => {
                        if sender.send(msg).await.is_err() { break; }
                    }
                    None => break,
                }
            }

            // Frames from the client
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Text(txt))) => {
                        if let Ok(evt) = serde_json::from_str::<WsInboundEvent>(&txt) {
                            handle_ws_event(&evt, &params, user_id, &state).await;
                        }
                    }
                    Some(Ok(Message::Ping(_))) => {
                        // Pong is handled by the framework
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }
}

async fn handle_ws_event(evt: &WsInboundEvent, params: &WsParams, user_id: Uuid, state: &AppState) {
    match evt {
        WsInboundEvent::Typing {
            group_id,
            user_id: claimed,
        } => {
            // Drop events that do not belong to this connection
            if group_id != &params.group_id || claimed != &user_id {
                return;
            }

            let out = WsOutboundEvent::Typing {
                group_id: *group_id,
                user_id: *claimed,
            };

            match serde_json::to_string(&out) {
                Ok(out_txt) => {
                    state
                        .registry
                        .broadcast(*group_id, Message::Text(out_txt.clone()))
                        .await;
                    let _ = crate::websocket::pubsub::publish(&state.redis, *group_id, &out_txt).await;
                }
                Err(e) => {
                    error!(error = %e, group_id = %group_id, "failed to serialize typing event");
                }
            }
        }
    }
}
