//! HTTP front door and default HTTP application.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → dispatch (protocol lookup)
//!     → app.rs (http)  |  orders (websocket)
//!     → Send to client
//! ```

pub mod app;
pub mod request;
pub mod server;

pub use app::default_application;
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::FrontDoorServer;
