//! Default HTTP application.
//!
//! # Responsibilities
//! - Serve `GET /health`
//! - Answer everything else with `404`
//! - Bound request time and body size
//!
//! Mounted behind the dispatcher for the `http` protocol.

use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer};

use crate::config::{GatewayConfig, SettingsSource};
use crate::net::ConnectionTracker;

#[derive(Clone)]
struct AppState {
    settings: SettingsSource,
    tracker: ConnectionTracker,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub settings: String,
    pub websocket_sessions: u64,
}

/// Build the HTTP application served for `http` connections.
#[allow(deprecated)]
pub fn default_application(config: &GatewayConfig, tracker: ConnectionTracker) -> Router {
    let state = AppState {
        settings: config.settings_source.clone(),
        tracker,
    };

    Router::new()
        .route("/health", get(health))
        .fallback(not_found)
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
}

async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        settings: state.settings.to_string(),
        websocket_sessions: state.tracker.active_count(),
    })
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}
