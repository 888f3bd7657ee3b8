//! MiniC API /v1: sessions over HTTP
//!
//! Each session is one source buffer plus its pipeline state; clients drive
//! it with the same four events the CLI uses (load, edit, run, reset).
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod state;

pub use error::ApiError;
pub use state::{AppState, DEFAULT_MAX_SESSIONS};

use axum::{
    routing::{get, post, put},
    Router,
};
use minic_core::AnalyzerAdapter;
use minic_out::Transcripts;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Default bind address, overridable with `MINIC_ADDR`.
pub const DEFAULT_ADDR: &str = "0.0.0.0:8787";
pub const ADDR_ENV: &str = "MINIC_ADDR";
pub const MAX_SESSIONS_ENV: &str = "MINIC_MAX_SESSIONS";

pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/sessions", post(handlers::create_session))
        .route(
            "/v1/sessions/{id}",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route(
            "/v1/sessions/{id}/source",
            put(handlers::put_source).patch(handlers::patch_source),
        )
        .route("/v1/sessions/{id}/phases/{phase}", post(handlers::run_phase))
        .route("/v1/sessions/{id}/reset", post(handlers::reset_session))
        .route("/v1/sessions/{id}/transcript", get(handlers::transcript))
        .route("/v1/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(axum::middleware::from_fn(middleware::version_header))
        .layer(middleware::cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// State with built-in transcript templates and a fresh metrics registry.
pub fn default_state(adapter: Arc<dyn AnalyzerAdapter>, max_sessions: usize) -> Result<Arc<AppState>, ApiError> {
    let transcripts = Transcripts::builtin()?;
    let metrics = metrics::Metrics::new().map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Arc::new(AppState::new(adapter, transcripts, metrics).with_max_sessions(max_sessions)))
}

/// Bind `addr` and serve until the process is stopped.
pub async fn run(addr: &str, state: Arc<AppState>) -> std::io::Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("MiniC API listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await
}
