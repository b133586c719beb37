//! WebSocket routing table for order traffic.
//!
//! Paths not listed here get `404`, which fails the websocket handshake.
//! Routes accept any method: HTTP/1.1 upgrades arrive as `GET`, HTTP/2
//! extended CONNECT as `CONNECT`, and `WebSocketUpgrade` checks both.

use axum::{
    extract::{Path, State, WebSocketUpgrade},
    response::Response,
    routing::any,
    Router,
};

use crate::orders::{session::run_session, OrderState};

/// Build the order routing table.
pub fn order_router(state: OrderState) -> Router {
    Router::new()
        .route("/orders/{order_id}", any(order_socket))
        .with_state(state)
}

async fn order_socket(
    ws: WebSocketUpgrade,
    Path(order_id): Path<String>,
    State(state): State<OrderState>,
) -> Response {
    tracing::debug!(order_id = %order_id, "Upgrading order socket");
    ws.max_message_size(state.max_message_bytes)
        .on_failed_upgrade(|e: axum::Error| tracing::warn!(error = %e, "Order socket upgrade failed"))
        .on_upgrade(move |socket| run_session(socket, order_id, state))
}
