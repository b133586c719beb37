//! A single websocket session attached to an order group.
//!
//! # Data Flow
//! ```text
//! client text frame ──▶ OrderGroups::publish ──▶ every member (sender included)
//! group frame       ──▶ socket sink
//! shutdown          ──▶ close 1001, leave group
//! ```

use std::sync::Arc;

use axum::extract::ws::{close_code, CloseFrame, Message, Utf8Bytes, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tokio_tungstenite::tungstenite;

use crate::observability::metrics;
use crate::orders::{OrderMessage, OrderState};

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    ClientClosed,
    SocketError,
    MessageTooLarge,
    Shutdown,
}

impl SessionEnd {
    fn close_frame(self) -> Option<CloseFrame> {
        match self {
            SessionEnd::MessageTooLarge => Some(CloseFrame {
                code: close_code::POLICY,
                reason: Utf8Bytes::from_static("message too large"),
            }),
            SessionEnd::Shutdown => Some(CloseFrame {
                code: close_code::AWAY,
                reason: Utf8Bytes::from_static("server shutting down"),
            }),
            SessionEnd::ClientClosed | SessionEnd::SocketError => None,
        }
    }
}

/// Run a session until the client leaves, the socket fails, or the server shuts down.
pub async fn run_session(socket: WebSocket, order_id: String, state: OrderState) {
    let guard = state.tracker.track();
    let connection_id = guard.id();
    let order_key: Arc<str> = Arc::from(order_id.as_str());
    let mut shutdown = state.shutdown.subscribe();
    let mut group = state.groups.join(&order_id);
    let (mut sink, mut stream) = socket.split();

    tracing::info!(
        connection_id = %connection_id,
        order_id = %order_id,
        "Order session opened"
    );

    let end = loop {
        tokio::select! {
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if text.as_str().len() > state.max_message_bytes {
                        tracing::warn!(
                            connection_id = %connection_id,
                            size = text.as_str().len(),
                            limit = state.max_message_bytes,
                            "Closing session: message too large"
                        );
                        break SessionEnd::MessageTooLarge;
                    }
                    let reached = state.groups.publish(OrderMessage {
                        order_id: order_key.clone(),
                        text,
                    });
                    metrics::record_order_message();
                    tracing::trace!(connection_id = %connection_id, reached, "Frame relayed");
                }
                Some(Ok(Message::Binary(_))) => {
                    tracing::debug!(connection_id = %connection_id, "Ignoring binary frame");
                }
                // Pings are answered by the websocket layer.
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {}
                Some(Ok(Message::Close(_))) | None => break SessionEnd::ClientClosed,
                Some(Err(e)) => {
                    tracing::warn!(connection_id = %connection_id, error = %e, "Websocket receive failed");
                    if exceeds_size_limit(e) {
                        break SessionEnd::MessageTooLarge;
                    }
                    break SessionEnd::SocketError;
                }
            },
            relayed = group.recv() => match relayed {
                Ok(message) => {
                    if let Err(e) = sink.send(Message::Text(message.text)).await {
                        tracing::warn!(connection_id = %connection_id, error = %e, "Websocket send failed");
                        break SessionEnd::SocketError;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(connection_id = %connection_id, skipped, "Session lagging, frames dropped");
                }
                Err(RecvError::Closed) => break SessionEnd::SocketError,
            },
            _ = shutdown.recv() => break SessionEnd::Shutdown,
        }
    };

    if let Some(frame) = end.close_frame() {
        let _ = sink.send(Message::Close(Some(frame))).await;
    }
    let _ = sink.close().await;

    drop(group);
    state.groups.leave(&order_id);

    tracing::info!(
        connection_id = %connection_id,
        order_id = %order_id,
        reason = ?end,
        "Order session closed"
    );
    drop(guard);
}

/// True when the codec refused a frame for exceeding `max_message_size`.
fn exceeds_size_limit(error: axum::Error) -> bool {
    matches!(
        error.into_inner().downcast::<tungstenite::Error>().map(|e| *e),
        Ok(tungstenite::Error::Capacity(
            tungstenite::error::CapacityError::MessageTooLong { .. }
        ))
    )
}
