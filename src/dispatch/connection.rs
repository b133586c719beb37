//! Inbound connection classification.
//!
//! # Responsibilities
//! - Derive the declared protocol from the request that opened the connection
//! - Carry the untouched request (and its upgrade handle) to the handler
//!
//! # Design Decisions
//! - HTTP/1.1 upgrades are declared by `Connection: upgrade` + `Upgrade: <token>`
//! - HTTP/2 extended CONNECT declares the protocol in the `:protocol` pseudo-header
//! - Anything else is plain `http`

use std::fmt;
use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, HeaderMap, Method, Request},
};

use crate::dispatch::Protocol;

/// A connection waiting to be dispatched, annotated with its declared protocol.
pub struct Connection {
    protocol: String,
    peer: Option<SocketAddr>,
    request: Request<Body>,
}

impl Connection {
    /// Wrap a request with an explicitly declared protocol.
    pub fn new(protocol: impl Into<String>, request: Request<Body>) -> Self {
        let peer = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0);
        Self {
            protocol: protocol.into(),
            peer,
            request,
        }
    }

    /// Classify a request by the protocol it asks for.
    pub fn from_request(request: Request<Body>) -> Self {
        let protocol = declared_protocol(&request);
        Self::new(protocol, request)
    }

    /// The declared protocol, lower-cased.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Request path.
    pub fn path(&self) -> &str {
        self.request.uri().path()
    }

    /// Remote peer, when the server recorded one.
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Hand the request over to a handler.
    pub fn into_request(self) -> Request<Body> {
        self.request
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("protocol", &self.protocol)
            .field("path", &self.path())
            .field("peer", &self.peer)
            .finish()
    }
}

/// Protocol a request declares.
pub fn declared_protocol<B>(request: &Request<B>) -> String {
    if request.method() == Method::CONNECT {
        if let Some(protocol) = request.extensions().get::<hyper::ext::Protocol>() {
            return normalize_token(protocol.as_str());
        }
    }

    if requests_upgrade(request.headers()) {
        if let Some(token) = request
            .headers()
            .get(header::UPGRADE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(normalize_token)
            .filter(|t| !t.is_empty())
        {
            return token;
        }
    }

    Protocol::Http.as_str().to_string()
}

fn requests_upgrade(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|token| token.trim().eq_ignore_ascii_case("upgrade"))
}

/// `"WebSocket"` → `"websocket"`, `"TLS/1.2"` → `"tls"`.
fn normalize_token(token: &str) -> String {
    token
        .split('/')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
