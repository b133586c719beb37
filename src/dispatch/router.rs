//! Protocol lookup and dispatch.
//!
//! # Responsibilities
//! - Store one handler per protocol
//! - Forward a connection to the handler for its declared protocol
//! - Reject connections whose protocol has no handler
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Duplicate registrations fail the build instead of silently replacing
//! - Explicit rejection rather than a silent default handler

use std::collections::HashMap;
use std::fmt;

use axum::response::Response;

use crate::dispatch::{Connection, DispatchError, HandlerRef, Protocol};
use crate::observability::metrics;

/// Routes connections to handlers by declared protocol.
pub struct ProtocolRouter {
    handlers: HashMap<Protocol, HandlerRef>,
}

impl ProtocolRouter {
    pub fn builder() -> ProtocolRouterBuilder {
        ProtocolRouterBuilder::default()
    }

    /// Registered protocols, sorted.
    pub fn protocols(&self) -> Vec<Protocol> {
        let mut protocols: Vec<Protocol> = self.handlers.keys().copied().collect();
        protocols.sort();
        protocols
    }

    /// Look up the handler for a declared protocol.
    pub fn handler_for(&self, protocol: &str) -> Result<HandlerRef, DispatchError> {
        self.lookup(protocol).map(|(_, handler)| handler)
    }

    /// Forward a connection to its protocol's handler.
    ///
    /// The handler is invoked exactly once; its response is returned as-is.
    /// Unknown protocols are rejected before any handler runs.
    pub async fn dispatch(&self, connection: Connection) -> Result<Response, DispatchError> {
        let (protocol, handler) = match self.lookup(connection.protocol()) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(
                    protocol = %connection.protocol(),
                    path = %connection.path(),
                    peer = ?connection.peer(),
                    "Rejecting connection with unsupported protocol"
                );
                metrics::record_dispatch("unsupported", "rejected");
                return Err(e);
            }
        };

        tracing::debug!(
            protocol = %protocol,
            path = %connection.path(),
            peer = ?connection.peer(),
            "Dispatching connection"
        );
        metrics::record_dispatch(protocol.as_str(), "routed");

        Ok(handler.handle(connection).await)
    }

    fn lookup(&self, declared: &str) -> Result<(Protocol, HandlerRef), DispatchError> {
        let protocol: Protocol = declared.parse()?;
        self.handlers
            .get(&protocol)
            .map(|handler| (protocol, handler.clone()))
            .ok_or_else(|| DispatchError::UnsupportedProtocol(declared.to_string()))
    }
}

impl fmt::Debug for ProtocolRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtocolRouter")
            .field("protocols", &self.protocols())
            .finish()
    }
}

/// Collects handler registrations for a [`ProtocolRouter`].
#[derive(Default)]
pub struct ProtocolRouterBuilder {
    routes: Vec<(Protocol, HandlerRef)>,
}

impl ProtocolRouterBuilder {
    /// Register the handler for a protocol.
    pub fn route(mut self, protocol: Protocol, handler: HandlerRef) -> Self {
        self.routes.push((protocol, handler));
        self
    }

    /// Freeze the mapping. Fails if a protocol was registered twice.
    pub fn build(self) -> Result<ProtocolRouter, DispatchError> {
        let mut handlers = HashMap::with_capacity(self.routes.len());
        for (protocol, handler) in self.routes {
            if handlers.insert(protocol, handler).is_some() {
                return Err(DispatchError::DuplicateHandler(protocol));
            }
        }
        Ok(ProtocolRouter { handlers })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::ConnectionHandler;
    use axum::{body::Body, http::Request, response::IntoResponse};
    use futures_util::future::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    struct CountingHandler {
        name: &'static str,
        counter: Arc<Counting>,
    }

    impl ConnectionHandler for CountingHandler {
        fn handle(&self, _connection: Connection) -> BoxFuture<'static, Response> {
            self.counter.calls.fetch_add(1, Ordering::SeqCst);
            let name = self.name;
            Box::pin(async move { name.into_response() })
        }
    }

    fn handler(name: &'static str) -> (HandlerRef, Arc<Counting>) {
        let counter = Arc::new(Counting::default());
        let handler = Arc::new(CountingHandler {
            name,
            counter: counter.clone(),
        });
        (handler, counter)
    }

    fn connection(protocol: &str, path: &str) -> Connection {
        let req = Request::builder().uri(path).body(Body::empty()).unwrap();
        Connection::new(protocol, req)
    }

    fn router() -> (ProtocolRouter, Arc<Counting>, Arc<Counting>) {
        let (http, http_calls) = handler("http");
        let (ws, ws_calls) = handler("websocket");
        let router = ProtocolRouter::builder()
            .route(Protocol::Http, http)
            .route(Protocol::WebSocket, ws)
            .build()
            .unwrap();
        (router, http_calls, ws_calls)
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn http_goes_to_http_handler_once() {
        let (router, http_calls, ws_calls) = router();

        let response = router.dispatch(connection("http", "/")).await.unwrap();

        assert_eq!(body_text(response).await, "http");
        assert_eq!(http_calls.calls.load(Ordering::SeqCst), 1);
        assert_eq!(ws_calls.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn websocket_goes_to_websocket_handler_once() {
        let (router, http_calls, ws_calls) = router();

        let response = router
            .dispatch(connection("websocket", "/orders/1"))
            .await
            .unwrap();

        assert_eq!(body_text(response).await, "websocket");
        assert_eq!(ws_calls.calls.load(Ordering::SeqCst), 1);
        assert_eq!(http_calls.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_protocol_is_rejected_without_invoking_handlers() {
        let (router, http_calls, ws_calls) = router();

        for protocol in ["ftp", "h2c", "", "websockets", "HTTP", "WebSocket"] {
            let err = router.dispatch(connection(protocol, "/")).await.unwrap_err();
            assert_eq!(err, DispatchError::UnsupportedProtocol(protocol.to_string()));
        }

        assert_eq!(http_calls.calls.load(Ordering::SeqCst), 0);
        assert_eq!(ws_calls.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn known_but_unregistered_protocol_is_rejected() {
        let (http, http_calls) = handler("http");
        let router = ProtocolRouter::builder()
            .route(Protocol::Http, http)
            .build()
            .unwrap();

        let err = router
            .dispatch(connection("websocket", "/orders/1"))
            .await
            .unwrap_err();
        assert_eq!(err, DispatchError::UnsupportedProtocol("websocket".into()));
        assert_eq!(http_calls.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn duplicate_registration_fails_build() {
        let (a, _) = handler("a");
        let (b, _) = handler("b");
        let err = ProtocolRouter::builder()
            .route(Protocol::Http, a)
            .route(Protocol::Http, b)
            .build()
            .unwrap_err();
        assert_eq!(err, DispatchError::DuplicateHandler(Protocol::Http));
    }

    #[tokio::test]
    async fn construction_is_idempotent() {
        let (first, first_http, _) = router();
        let (second, second_http, _) = router();

        assert_eq!(first.protocols(), second.protocols());
        assert_eq!(first.protocols(), vec![Protocol::Http, Protocol::WebSocket]);

        first.dispatch(connection("http", "/")).await.unwrap();
        assert_eq!(first_http.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_http.calls.load(Ordering::SeqCst), 0);
    }
}
