//! Shared utilities for front-door integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use order_frontdoor::config::GatewayConfig;
use order_frontdoor::{AppContext, FrontDoorServer};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A front door running on an ephemeral port.
pub struct TestFrontDoor {
    pub addr: SocketAddr,
    pub ctx: AppContext,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

impl TestFrontDoor {
    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn ws_url(&self, path: &str) -> String {
        format!("ws://{}{}", self.addr, path)
    }

    /// Wait until exactly `count` websocket sessions are live.
    pub async fn wait_for_sessions(&self, count: u64) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while self.ctx.tracker.active_count() != count {
            assert!(
                tokio::time::Instant::now() < deadline,
                "expected {} sessions, have {}",
                count,
                self.ctx.tracker.active_count()
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

/// Start a front door with the given configuration.
pub async fn spawn_frontdoor(config: GatewayConfig) -> TestFrontDoor {
    let ctx = AppContext::default();
    let server = FrontDoorServer::new(&config, &ctx).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let signal = ctx.shutdown.subscribe();

    let handle = tokio::spawn(server.run(listener, signal));

    TestFrontDoor { addr, ctx, handle }
}
