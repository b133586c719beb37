//! Front-door server setup.
//!
//! # Responsibilities
//! - Wrap the protocol dispatcher as the single catch-all service
//! - Wire up middleware (request ID, tracing, `Server` header)
//! - Serve on a listener until shutdown, then drain websocket sessions

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::application::{application, AppContext};
use crate::config::GatewayConfig;
use crate::dispatch::{Connection, DispatchError, ProtocolRouter};
use crate::http::request::{propagate_request_id, set_request_id, RequestIdExt};
use crate::lifecycle::ShutdownSignal;
use crate::net::ConnectionTracker;

/// The process's single listener: every connection enters here and is
/// dispatched by protocol.
pub struct FrontDoorServer {
    router: Router,
    dispatcher: Arc<ProtocolRouter>,
    tracker: ConnectionTracker,
    shutdown_grace: Duration,
}

impl FrontDoorServer {
    /// Compose the default application and order router behind a front door.
    pub fn new(config: &GatewayConfig, ctx: &AppContext) -> Result<Self, DispatchError> {
        let dispatcher = Arc::new(application(config, ctx)?);
        Ok(Self::with_dispatcher(dispatcher, config, ctx.tracker.clone()))
    }

    /// Serve an already-built dispatcher.
    pub fn with_dispatcher(
        dispatcher: Arc<ProtocolRouter>,
        config: &GatewayConfig,
        tracker: ConnectionTracker,
    ) -> Self {
        Self {
            router: Self::build_router(dispatcher.clone()),
            dispatcher,
            tracker,
            shutdown_grace: Duration::from_secs(config.timeouts.shutdown_grace_secs),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(dispatcher: Arc<ProtocolRouter>) -> Router {
        Router::new()
            .fallback(front_door)
            .with_state(dispatcher)
            .layer(SetResponseHeaderLayer::if_not_present(
                header::SERVER,
                HeaderValue::from_static(concat!("order-frontdoor/", env!("CARGO_PKG_VERSION"))),
            ))
            .layer(propagate_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id())
    }

    /// The fully layered service, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn dispatcher(&self) -> &Arc<ProtocolRouter> {
        &self.dispatcher
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            protocols = ?self.dispatcher.protocols(),
            "Front door listening"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.recv().await })
            .await?;

        tracing::info!(
            sessions = self.tracker.active_count(),
            grace = ?self.shutdown_grace,
            "Listener closed, draining websocket sessions"
        );
        if !self.tracker.wait_for_drain(self.shutdown_grace).await {
            tracing::warn!(
                sessions = self.tracker.active_count(),
                "Shutdown grace period elapsed with sessions still open"
            );
        }

        tracing::info!("Front door stopped");
        Ok(())
    }
}

/// Catch-all handler: classify the connection and hand it to its protocol's handler.
async fn front_door(State(dispatcher): State<Arc<ProtocolRouter>>, request: Request) -> Response {
    let request_id = request.request_id().unwrap_or("unknown").to_string();
    match dispatcher.dispatch(Connection::from_request(request)).await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!(request_id = %request_id, error = %e, "Connection rejected");
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode};
    use tower::ServiceExt;

    fn server() -> FrontDoorServer {
        FrontDoorServer::new(&GatewayConfig::default(), &AppContext::default()).unwrap()
    }

    #[tokio::test]
    async fn http_requests_reach_default_application() {
        let response = server()
            .router()
            .oneshot(axum::http::Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert!(response
            .headers()
            .get(header::SERVER)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("order-frontdoor/"));
    }

    #[tokio::test]
    async fn unsupported_upgrade_is_rejected_and_closed() {
        let response = server()
            .router()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/")
                    .header("connection", "upgrade")
                    .header("upgrade", "ftp")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers().get(header::CONNECTION).unwrap(), "close");
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&bytes[..], b"unsupported protocol: ftp");
    }

    #[tokio::test]
    async fn http2_extended_connect_is_routed_to_order_sockets() {
        let mut request = axum::http::Request::builder()
            .method(axum::http::Method::CONNECT)
            .version(axum::http::Version::HTTP_2)
            .uri("/orders/1")
            .header("sec-websocket-version", "13")
            .body(Body::empty())
            .unwrap();
        request
            .extensions_mut()
            .insert(hyper::ext::Protocol::from_static("websocket"));

        let response = server().router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UPGRADE_REQUIRED);
    }

    #[test]
    fn dispatcher_maps_both_protocols() {
        use crate::dispatch::Protocol;
        assert_eq!(
            server().dispatcher().protocols(),
            vec![Protocol::Http, Protocol::WebSocket]
        );
    }
}
