//! Dispatch errors.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::dispatch::Protocol;

/// Errors raised while building or running the protocol router.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The connection declared a protocol with no registered handler.
    #[error("unsupported protocol: {0}")]
    UnsupportedProtocol(String),

    /// Two handlers were registered for the same protocol.
    #[error("duplicate handler registered for protocol {0}")]
    DuplicateHandler(Protocol),
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let status = match &self {
            DispatchError::UnsupportedProtocol(_) => StatusCode::BAD_REQUEST,
            DispatchError::DuplicateHandler(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, [(header::CONNECTION, "close")], self.to_string()).into_response()
    }
}
