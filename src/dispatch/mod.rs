//! Protocol dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request (from the front-door server)
//!     → connection.rs (classify: http / websocket / other upgrade token)
//!     → router.rs (look up handler for the declared protocol)
//!     → handler.rs (forward the connection unchanged)
//!     → Response from the selected handler
//!
//! Unknown protocol:
//!     → DispatchError::UnsupportedProtocol
//!     → 400 Bad Request, Connection: close
//! ```
//!
//! # Design Decisions
//! - Mapping built once at startup, immutable afterwards (shared via Arc)
//! - Handlers injected at construction, no lookup by name
//! - Dispatcher keeps no per-connection state

pub mod connection;
pub mod error;
pub mod handler;
pub mod protocol;
pub mod router;

pub use connection::Connection;
pub use error::DispatchError;
pub use handler::{ConnectionHandler, HandlerRef};
pub use protocol::Protocol;
pub use router::{ProtocolRouter, ProtocolRouterBuilder};
