//! # rcert-api — HTTP Surface
//!
//! | Prefix                | Module                          | Auth   |
//! |-----------------------|---------------------------------|--------|
//! | `/v1/public/*`        | [`routes::public`]              | none   |
//! | `/v1/works/*`         | [`routes::works`]               | bearer |
//! | `/v1/certificates/*`  | [`routes::certificates`]        | bearer |
//! | `/v1/batches/*`       | [`routes::batches`]             | bearer |
//! | `/metrics`            | here                            | bearer |
//! | `/health/*`           | here                            | none   |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware → Handler
//! ```
//!
//! Handlers hold no business logic; they delegate to `rcert-cert` and
//! `rcert-batch` and map errors through [`AppError`].

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::middleware::metrics::MetricsSnapshot;

pub use config::AppConfig;
pub use error::AppError;
pub use state::{AppState, BatchRegistry};

/// Assemble the application router.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };
    let metrics = state.metrics.clone();

    let dashboard = Router::new()
        .merge(routes::works::router())
        .merge(routes::certificates::router())
        .merge(routes::batches::router())
        .route("/metrics", get(metrics_handler))
        .layer(from_fn(auth::auth_middleware));

    let public = Router::new().merge(routes::public::router());

    let api = Router::new()
        .merge(public)
        .merge(dashboard)
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(auth_config))
        .layer(axum::Extension(metrics))
        .with_state(state.clone());

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .with_state(state);

    Router::new().merge(health).merge(api)
}

async fn metrics_handler(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

async fn liveness() -> &'static str {
    "ok"
}

/// Ready once the signer has a well-formed public key.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    if state.public_key_hex.len() != 64 {
        return (StatusCode::SERVICE_UNAVAILABLE, "signing key degraded").into_response();
    }
    (StatusCode::OK, "ready").into_response()
}
