pub mod devices;

use crate::state::AppState;
use axum::routing::{delete, get, post};
use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

pub fn build_router() -> Router<AppState> {
    let introspection = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/metrics", get(metrics));

    let api_v1 = Router::new()
        .route("/devices", post(devices::register_device))
        .route("/devices", delete(devices::unregister_device))
        .route("/devices", get(devices::list_devices))
        .layer(middleware::from_fn(crate::middleware::auth_middleware));

    introspection
        .merge(Router::new().nest("/api/v1", api_v1))
        .layer(TraceLayer::new_for_http())
}

async fn metrics() -> String {
    serde_json::json!({
        "service": "notification-service",
        "version": "0.1.0",
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })
    .to_string()
}
