//! Binary entrypoint for the MiniC API server.
use minic_api::{default_state, run, ADDR_ENV, DEFAULT_ADDR, DEFAULT_MAX_SESSIONS, MAX_SESSIONS_ENV};
use minic_stages::PipelineConfig;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Listen address can be overridden with MINIC_ADDR
    let addr = std::env::var(ADDR_ENV).unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let max_sessions = match std::env::var(MAX_SESSIONS_ENV) {
        Ok(raw) => raw.parse::<usize>().map_err(|e| format!("{}={}: {}", MAX_SESSIONS_ENV, raw, e))?,
        Err(_) => DEFAULT_MAX_SESSIONS,
    };
    let analyzers = PipelineConfig::from_env()?.build()?;
    for (phase, id) in analyzers.describe() {
        tracing::info!(%phase, analyzer = %id, "analyzer bound");
    }

    run(&addr, default_state(Arc::new(analyzers), max_sessions)?).await?;
    Ok(())
}
