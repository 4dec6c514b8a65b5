use std::sync::Arc;

use hub_fcm_shared::{FcmClient, ServiceAccountKey};
use notification_service::{
    config, db, error, handlers, logging, migrations,
    services::{consumer, FanOutEngine},
    state::AppState,
};

fn load_fcm_client(path: &str) -> Result<FcmClient, error::AppError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| error::AppError::Config(format!("read fcm credentials: {e}")))?;
    let key: ServiceAccountKey = serde_json::from_str(&raw)
        .map_err(|e| error::AppError::Config(format!("parse fcm credentials: {e}")))?;
    Ok(FcmClient::new(key))
}

#[tokio::main]
async fn main() -> Result<(), error::AppError> {
    logging::init_tracing();
    let cfg = Arc::new(config::Config::from_env()?);

    let db = db::init_pool(&cfg.database_url)
        .await
        .map_err(|e| error::AppError::StartServer(format!("db: {e}")))?;

    migrations::run_all(&db)
        .await
        .map_err(|e| error::AppError::StartServer(format!("database migrations failed: {e}")))?;

    auth_core::initialize_validation(&cfg.jwt_public_key_pem)
        .map_err(|e| error::AppError::StartServer(format!("init jwt: {e}")))?;

    let fcm = match cfg.fcm_credentials_path.as_deref() {
        Some(path) => match load_fcm_client(path) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                tracing::warn!(error = %e, "failed to initialize FCM client; push delivery disabled");
                None
            }
        },
        None => {
            tracing::warn!("FCM_CREDENTIALS_PATH not set; push delivery disabled");
            None
        }
    };

    let redis = redis::Client::open(cfg.redis_url.clone())
        .map_err(|e| error::AppError::StartServer(format!("redis: {e}")))?;

    // Fan-out consumer: one task per instance, safe across instances via
    // the consumer group.
    let engine = FanOutEngine::new(db.clone(), fcm);
    let consumer_cfg =
        consumer::ConsumerConfig::new(cfg.events_stream.clone(), cfg.consumer_group.clone());
    let consumer_client = redis.clone();
    tokio::spawn(async move {
        if let Err(e) = consumer::run(consumer_client, consumer_cfg, engine).await {
            tracing::error!(error = %e, "event consumer failed");
        }
    });

    let state = AppState {
        db,
        config: cfg.clone(),
    };

    let bind_addr = format!("0.0.0.0:{}", cfg.port);
    tracing::info!(%bind_addr, "starting notification-service");

    let app = handlers::build_router().with_state(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| error::AppError::StartServer(e.to_string()))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| error::AppError::StartServer(e.to_string()))?;

    Ok(())
}
