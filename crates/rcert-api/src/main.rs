//! # rcert-api — Binary Entry Point
//!
//! Starts the Axum HTTP server. Configuration comes from the environment
//! (see [`rcert_api::config`]).

use rcert_api::{AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if std::env::var("RCERT_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("configuration rejected: {e}");
        e
    })?;
    tracing::info!(?config, "configuration loaded");
    let port = config.port;

    let state = AppState::from_config(config).map_err(|e| {
        tracing::error!("startup failed: {e}");
        e
    })?;
    tracing::info!(key_id = %state.key_id, "signer ready");

    let app = rcert_api::app(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("rcert API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
