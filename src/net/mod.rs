//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! WebSocket handshake completes
//!     → connection.rs (assign ConnectionId, take tracker guard)
//!     → session runs until close / error / shutdown
//!     → guard dropped, live count decremented
//!
//! Shutdown:
//!     server stops accepting → wait_for_drain(grace) → exit
//! ```

pub mod connection;

pub use connection::{ConnectionGuard, ConnectionId, ConnectionTracker};
