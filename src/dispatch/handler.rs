//! Handler seam between the dispatcher and the protocol collaborators.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{response::Response, Router};
use futures_util::future::BoxFuture;
use tower::ServiceExt;

use crate::dispatch::Connection;

/// Something that fully processes a connection of one protocol.
///
/// The dispatcher calls `handle` exactly once per routed connection and
/// returns whatever the handler produces.
pub trait ConnectionHandler: Send + Sync + 'static {
    fn handle(&self, connection: Connection) -> BoxFuture<'static, Response>;
}

/// Shared handle stored in the protocol mapping.
pub type HandlerRef = Arc<dyn ConnectionHandler>;

/// Any finished axum router is a handler: the request is served as-is.
impl ConnectionHandler for Router {
    fn handle(&self, connection: Connection) -> BoxFuture<'static, Response> {
        let service = self.clone();
        Box::pin(async move {
            let result: Result<Response, Infallible> =
                service.oneshot(connection.into_request()).await;
            match result {
                Ok(response) => response,
                Err(never) => match never {},
            }
        })
    }
}
