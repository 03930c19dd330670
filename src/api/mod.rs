//! HTTP API for score submission
//!
//! ## Architecture
//!
//! - **Axum** web framework with Tower middleware
//! - **Backend** injected through [`ApiState`]; handlers never look at configuration
//! - **Static files** served from a directory for everything not routed
//!
//! ## Endpoints
//!
//! - `GET /healthz` - Liveness
//! - `GET /readyz` - Backend readiness
//! - `GET /metrics` - Prometheus metrics
//! - `GET /api/scores` - 50 most recent scores
//! - `POST /api/scores` - Submit a score
//! - `POST /api/session/start` - Increment active sessions
//! - `POST /api/session/end` - Decrement active sessions
//! - `GET /` - Landing page

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod types;

pub use error::{ApiError, ApiResult};
pub use state::ApiState;
pub use types::{OkResponse, ReadyResponse};

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind address (e.g., "0.0.0.0:3000")
    pub bind_addr: SocketAddr,

    /// Allow cross-origin requests from anywhere
    pub enable_cors: bool,

    /// Directory served for unrouted GET requests
    pub static_dir: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            enable_cors: true,
            static_dir: Some(PathBuf::from("public")),
        }
    }
}

/// Build the application router
pub fn router(config: &ApiConfig, state: ApiState) -> Router {
    let metrics = state.metrics.clone();

    let mut app = Router::new()
        .route("/healthz", get(routes::health::healthz))
        .route("/readyz", get(routes::health::readyz))
        .route("/metrics", get(routes::metrics::metrics))
        .route(
            "/api/scores",
            get(routes::scores::list_scores).post(routes::scores::submit_score),
        )
        .route("/api/session/start", post(routes::session::start_session))
        .route("/api/session/end", post(routes::session::end_session))
        .with_state(state);

    if let Some(dir) = &config.static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app = app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(axum::middleware::from_fn_with_state(
                metrics,
                middleware::request_metrics::request_metrics,
            )),
    );

    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Run the API server until ctrl-c
pub async fn run_api_server(config: ApiConfig, state: ApiState) -> anyhow::Result<()> {
    let app = router(&config, state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("API server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

/// Spawn the API server in a background task
///
/// Returns the server's local address; binding to port 0 picks a free port.
pub async fn spawn_api_server(config: ApiConfig, state: ApiState) -> anyhow::Result<SocketAddr> {
    let app = router(&config, state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    let addr = listener.local_addr()?;

    info!("API server listening on {}", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("API server error: {}", e);
        }
    });

    Ok(addr)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
