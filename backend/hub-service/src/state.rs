use crate::{config::Config, websocket::ConnectionRegistry};
use sqlx::{Pool, Postgres};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Postgres>,
    pub redis: redis::Client,
    pub registry: ConnectionRegistry,
    pub config: Arc<Config>,
}
