//! Protocol identifiers understood by the dispatcher.

use std::fmt;
use std::str::FromStr;

use crate::dispatch::DispatchError;

/// A protocol the front door knows how to route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Protocol {
    Http,
    WebSocket,
}

impl Protocol {
    /// Every protocol, in a stable order.
    pub const ALL: [Protocol; 2] = [Protocol::Http, Protocol::WebSocket];

    /// Wire identifier, as declared on a connection.
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::WebSocket => "websocket",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Protocol::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| DispatchError::UnsupportedProtocol(s.to_string()))
    }
}
