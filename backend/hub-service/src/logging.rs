use tracing_subscriber::EnvFilter;

/// Initialize structured logging. RUST_LOG controls the filter; default is
/// info for our crates and warn elsewhere.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,hub_service=info,tower_http=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
