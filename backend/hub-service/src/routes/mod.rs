use crate::state::AppState;
use axum::middleware;
use axum::{
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde_json::json;

pub mod announcements;
pub mod groups;
pub mod messages;
pub mod profiles;
pub mod reports;
pub mod resources;
pub mod unions;

use announcements::{
    create_announcement, delete_announcement, list_announcements, update_announcement,
};
use groups::{add_group_member, create_group, list_groups, remove_group_member};
use messages::{delete_message, get_message_history, send_message};
use profiles::{delete_user, get_me, list_users, member_card, patch_user, update_me};
use reports::{create_report, list_reports, resolve_report};
use resources::{create_resource, delete_resource, list_resources, update_resource};
use unions::{create_union, join_union, leave_union, my_unions, update_member_role};

// OpenAPI endpoint handler
async fn openapi_json() -> Json<serde_json::Value> {
    use utoipa::OpenApi;
    Json(serde_json::to_value(crate::openapi::ApiDoc::openapi()).unwrap_or_default())
}

// Metrics endpoint for monitoring
async fn metrics() -> String {
    json!({
        "service": "hub-service",
        "version": "0.1.0",
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })
    .to_string()
}

pub fn build_router() -> Router<AppState> {
    // Service introspection endpoints (public, no session required)
    let introspection = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/metrics", get(metrics))
        .route("/openapi.json", get(openapi_json));

    // API v1 endpoints behind the JWT auth middleware
    let api_v1 = Router::new()
        // Profiles and identity cards
        .route("/me", get(get_me))
        .route("/me", put(update_me))
        .route("/me/card", get(member_card))
        // Site-admin user management
        .route("/users", get(list_users))
        .route("/users/:id", patch(patch_user))
        .route("/users/:id", delete(delete_user))
        // Unions and membership
        .route("/unions", post(create_union))
        .route("/unions", get(my_unions))
        .route("/unions/join", post(join_union))
        .route("/unions/:id/leave", post(leave_union))
        .route("/unions/:id/members/:user_id", patch(update_member_role))
        // Chat groups
        .route("/unions/:id/groups", post(create_group))
        .route("/unions/:id/groups", get(list_groups))
        .route("/groups/:id/members", post(add_group_member))
        .route("/groups/:id/members/:user_id", delete(remove_group_member))
        // Messages
        .route("/groups/:id/messages", post(send_message))
        .route("/groups/:id/messages", get(get_message_history))
        .route("/messages/:id", delete(delete_message))
        // Announcements
        .route("/unions/:id/announcements", get(list_announcements))
        .route("/unions/:id/announcements", post(create_announcement))
        .route("/announcements/:id", put(update_announcement))
        .route("/announcements/:id", delete(delete_announcement))
        // Vault resources
        .route("/unions/:id/resources", get(list_resources))
        .route("/unions/:id/resources", post(create_resource))
        .route("/resources/:id", put(update_resource))
        .route("/resources/:id", delete(delete_resource))
        // Reports
        .route("/unions/:id/reports", post(create_report))
        .route("/unions/:id/reports", get(list_reports))
        .route("/reports/:id", patch(resolve_report))
        // Realtime delivery. The handler does its own token validation (the
        // auth middleware lets this one path through) because browsers
        // cannot set headers on websocket connects.
        .route("/ws", get(crate::websocket::handlers::ws_handler));

    let secured_api_v1 = api_v1.layer(middleware::from_fn(
        crate::middleware::auth::auth_middleware,
    ));

    let router = introspection.merge(Router::new().nest("/api/v1", secured_api_v1));

    // Session guard is added last so it is the outermost layer: it decides
    // allow/redirect before any other request-scoped logic runs.
    crate::middleware::with_defaults(router).layer(middleware::from_fn(
        crate::middleware::session_guard::session_guard,
    ))
}
