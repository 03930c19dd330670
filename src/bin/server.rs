use std::sync::Arc;

use clap::Parser;
use snake_scores::{
    api::{ApiState, run_api_server},
    config::Args,
    metrics::Metrics,
    storage::select::select_backend,
};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{EnvFilter, filter, layer::SubscriberExt, util::SubscriberInitExt};

fn init() {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .compact()
        .with_ansi(false);

    // RUST_LOG takes over from the built-in targets when set
    if let Ok(env_filter) = EnvFilter::try_from_default_env() {
        tracing_subscriber::registry()
            .with(fmt_layer)
            .with(env_filter)
            .init();
        return;
    }

    let filter = filter::Targets::new().with_targets(vec![
        ("snake_scores", LevelFilter::DEBUG),
        ("server", LevelFilter::DEBUG),
        ("tower_http", LevelFilter::INFO),
    ]);
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init();

    let config = Args::parse().into_config();

    let backend = select_backend(&config.storage).await;
    let metrics = Arc::new(Metrics::new());

    info!(
        "Snake Game server starting on {} (backend={})",
        config.api.bind_addr,
        backend.name()
    );

    run_api_server(config.api, ApiState::new(backend, metrics)).await
}
