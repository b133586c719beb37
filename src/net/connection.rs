//! Long-lived connection tracking.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing
//! - Count live upgraded connections (websocket sessions)
//! - Let shutdown wait for the count to reach zero, with a deadline
//!
//! Upgraded connections leave the HTTP server's bookkeeping once the
//! handshake completes, so they are tracked here instead.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::observability::metrics;

/// Global atomic counter for connection IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Tracks live connections so shutdown can drain them.
///
/// The count is published on a watch channel; waiters are woken on every change.
#[derive(Debug, Clone)]
pub struct ConnectionTracker {
    active: Arc<watch::Sender<u64>>,
}

impl ConnectionTracker {
    /// Create a new connection tracker.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self {
            active: Arc::new(tx),
        }
    }

    /// Record a new live connection. Returns a guard that decrements on drop.
    pub fn track(&self) -> ConnectionGuard {
        let mut now = 0;
        self.active.send_modify(|count| {
            *count += 1;
            now = *count;
        });
        metrics::set_websocket_sessions(now);
        ConnectionGuard {
            active: Arc::clone(&self.active),
            id: ConnectionId::new(),
        }
    }

    /// Get current live connection count.
    pub fn active_count(&self) -> u64 {
        *self.active.borrow()
    }

    /// Wait until every tracked connection has closed.
    ///
    /// Returns `false` if the deadline passed first.
    pub async fn wait_for_drain(&self, deadline: Duration) -> bool {
        let mut rx = self.active.subscribe();
        tokio::time::timeout(deadline, rx.wait_for(|count| *count == 0))
            .await
            .map(|result| result.is_ok())
            .unwrap_or(false)
    }
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard that tracks a connection's lifetime.
/// Decrements active count when dropped.
#[derive(Debug)]
pub struct ConnectionGuard {
    active: Arc<watch::Sender<u64>>,
    id: ConnectionId,
}

impl ConnectionGuard {
    /// Get this connection's ID.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let mut now = 0;
        self.active.send_modify(|count| {
            *count = count.saturating_sub(1);
            now = *count;
        });
        metrics::set_websocket_sessions(now);
        tracing::trace!(connection_id = %self.id, "Connection closed");
    }
}
