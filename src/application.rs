//! Composition point: which handler serves which protocol.
//!
//! ```text
//! "http"      → http::app::default_application
//! "websocket" → orders::order_router
//! ```

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::dispatch::{DispatchError, Protocol, ProtocolRouter};
use crate::http::default_application;
use crate::lifecycle::Shutdown;
use crate::net::ConnectionTracker;
use crate::orders::{order_router, OrderState};

/// Process-wide handles shared by the front door and its handlers.
#[derive(Debug, Clone, Default)]
pub struct AppContext {
    pub tracker: ConnectionTracker,
    pub shutdown: Shutdown,
}

/// Build the protocol router for this deployment.
///
/// Each call produces an independent router with the same mapping.
pub fn application(
    config: &GatewayConfig,
    ctx: &AppContext,
) -> Result<ProtocolRouter, DispatchError> {
    let http = default_application(config, ctx.tracker.clone());
    let orders = order_router(OrderState::new(
        &config.websocket,
        ctx.tracker.clone(),
        ctx.shutdown.clone(),
    ));

    ProtocolRouter::builder()
        .route(Protocol::Http, Arc::new(http))
        .route(Protocol::WebSocket, Arc::new(orders))
        .build()
}
