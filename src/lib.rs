//! Protocol-dispatching front door for the order service.
//!
//! One listener accepts every connection, classifies it as `http` or
//! `websocket`, and hands it to the handler registered for that protocol.

pub mod application;
pub mod config;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod orders;

pub use application::{application, AppContext};
pub use config::GatewayConfig;
pub use dispatch::{Connection, DispatchError, Protocol, ProtocolRouter};
pub use http::FrontDoorServer;
pub use lifecycle::Shutdown;
