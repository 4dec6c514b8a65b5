use std::sync::Arc;

use hub_service::{
    config, db, error, logging, migrations, routes, state::AppState,
    websocket::{pubsub, ConnectionRegistry},
};

#[tokio::main]
async fn main() -> Result<(), error::AppError> {
    logging::init_tracing();
    let cfg = Arc::new(config::Config::from_env()?);

    let db = db::init_pool(&cfg.database_url)
        .await
        .map_err(|e| error::AppError::StartServer(format!("db: {e}")))?;

    // Run embedded migrations (idempotent). Schema drift is fatal.
    migrations::run_all(&db)
        .await
        .map_err(|e| error::AppError::StartServer(format!("database migrations failed: {e}")))?;

    // Validate-only JWT: the external auth provider signs, we verify.
    auth_core::initialize_validation(&cfg.jwt_public_key_pem)
        .map_err(|e| error::AppError::StartServer(format!("init jwt: {e}")))?;

    let redis = redis::Client::open(cfg.redis_url.clone())
        .map_err(|e| error::AppError::StartServer(format!("redis: {e}")))?;
    let registry = ConnectionRegistry::new();

    // Cross-instance realtime fan-in
    let psub_client = redis.clone();
    let psub_registry = registry.clone();
    tokio::spawn(async move {
        if let Err(e) = pubsub::start_psub_listener(psub_client, psub_registry).await {
            tracing::error!(error = %e, "redis pubsub listener failed");
        }
    });

    let state = AppState {
        db,
        redis,
        registry,
        config: cfg.clone(),
    };

    let bind_addr = format!("0.0.0.0:{}", cfg.port);
    tracing::info!(%bind_addr, "starting hub-service");

    let app = routes::build_router().with_state(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| error::AppError::StartServer(e.to_string()))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| error::AppError::StartServer(e.to_string()))?;

    Ok(())
}
