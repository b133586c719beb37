//! WebSocket order routing.
//!
//! # Data Flow
//! ```text
//! websocket connection (from the dispatcher)
//!     → router.rs (path table: /orders/{order_id})
//!     → session.rs (join group, relay frames)
//!     → groups.rs (per-order broadcast channels)
//! ```
//!
//! # Design Decisions
//! - Frames are relayed verbatim; their content is never inspected
//! - Every member of a group, the sender included, receives each frame
//! - Sessions observe process shutdown and close with `1001`

pub mod groups;
pub mod router;
pub mod session;

pub use groups::{OrderGroups, OrderMessage};
pub use router::order_router;

use crate::config::WebSocketConfig;
use crate::lifecycle::Shutdown;
use crate::net::ConnectionTracker;

/// State shared by every order session.
#[derive(Debug, Clone)]
pub struct OrderState {
    pub groups: OrderGroups,
    pub tracker: ConnectionTracker,
    pub shutdown: Shutdown,
    pub max_message_bytes: usize,
}

impl OrderState {
    pub fn new(config: &WebSocketConfig, tracker: ConnectionTracker, shutdown: Shutdown) -> Self {
        Self {
            groups: OrderGroups::new(config.channel_capacity),
            tracker,
            shutdown,
            max_message_bytes: config.max_message_bytes,
        }
    }
}
