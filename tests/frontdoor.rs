//! End-to-end tests over real sockets.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use order_frontdoor::config::GatewayConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

mod common;

async fn next_text<S>(ws: &mut S) -> String
where
    S: futures_util::Stream<Item = Result<Message, WsError>> + Unpin,
{
    let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
        .await
        .expect("timed out waiting for frame")
        .expect("stream ended")
        .expect("websocket error");
    msg.to_text().unwrap().to_string()
}

async fn next_close_code<S>(ws: &mut S) -> CloseCode
where
    S: futures_util::Stream<Item = Result<Message, WsError>> + Unpin,
{
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for close")
            .expect("stream ended before close frame")
            .expect("websocket error");
        if let Message::Close(Some(frame)) = msg {
            return frame.code;
        }
    }
}

#[tokio::test]
async fn http_connection_reaches_default_application() {
    let frontdoor = common::spawn_frontdoor(GatewayConfig::default()).await;

    let res = reqwest::get(frontdoor.http_url("/health")).await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["settings"], "defaults");

    let res = reqwest::get(frontdoor.http_url("/")).await.unwrap();
    assert_eq!(res.status(), 404);

    frontdoor.ctx.shutdown.trigger();
}

#[tokio::test]
async fn order_sockets_share_frames_within_an_order() {
    let frontdoor = common::spawn_frontdoor(GatewayConfig::default()).await;

    let (mut alice, _) = connect_async(frontdoor.ws_url("/orders/1")).await.unwrap();
    let (mut bob, _) = connect_async(frontdoor.ws_url("/orders/1")).await.unwrap();
    let (mut carol, _) = connect_async(frontdoor.ws_url("/orders/2")).await.unwrap();
    frontdoor.wait_for_sessions(3).await;

    alice.send(Message::text("Cooking")).await.unwrap();

    assert_eq!(next_text(&mut alice).await, "Cooking");
    assert_eq!(next_text(&mut bob).await, "Cooking");
    assert!(
        tokio::time::timeout(Duration::from_millis(200), carol.next())
            .await
            .is_err(),
        "other orders must not see the frame"
    );

    // The HTTP side sees the live sessions.
    let body: serde_json::Value = reqwest::get(frontdoor.http_url("/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["websocket_sessions"], 3);

    alice.close(None).await.unwrap();
    frontdoor.wait_for_sessions(2).await;

    frontdoor.ctx.shutdown.trigger();
}

#[tokio::test]
async fn unknown_websocket_path_fails_handshake() {
    let frontdoor = common::spawn_frontdoor(GatewayConfig::default()).await;

    match connect_async(frontdoor.ws_url("/chat/1")).await {
        Err(WsError::Http(response)) => assert_eq!(response.status(), 404),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("handshake should fail"),
    }
    assert_eq!(frontdoor.ctx.tracker.active_count(), 0);

    frontdoor.ctx.shutdown.trigger();
}

#[tokio::test]
async fn unsupported_protocol_is_rejected_and_connection_closed() {
    let frontdoor = common::spawn_frontdoor(GatewayConfig::default()).await;

    let mut stream = TcpStream::connect(frontdoor.addr).await.unwrap();
    stream
        .write_all(
            b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: Upgrade\r\nUpgrade: ftp\r\n\r\n",
        )
        .await
        .unwrap();

    let mut response = Vec::new();
    tokio::time::timeout(Duration::from_secs(2), stream.read_to_end(&mut response))
        .await
        .expect("server should close the connection")
        .unwrap();

    let response = String::from_utf8_lossy(&response);
    assert!(response.starts_with("HTTP/1.1 400"), "got: {response}");
    assert!(response.contains("unsupported protocol: ftp"));

    frontdoor.ctx.shutdown.trigger();
}

#[tokio::test]
async fn oversized_frame_closes_session_with_policy_violation() {
    let mut config = GatewayConfig::default();
    config.websocket.max_message_bytes = 8;
    let frontdoor = common::spawn_frontdoor(config).await;

    let (mut ws, _) = connect_async(frontdoor.ws_url("/orders/5")).await.unwrap();
    frontdoor.wait_for_sessions(1).await;

    ws.send(Message::text("this is far too long")).await.unwrap();

    assert_eq!(next_close_code(&mut ws).await, CloseCode::Policy);
    frontdoor.wait_for_sessions(0).await;

    frontdoor.ctx.shutdown.trigger();
}

#[tokio::test]
async fn shutdown_closes_sessions_and_stops_server() {
    let frontdoor = common::spawn_frontdoor(GatewayConfig::default()).await;

    let (mut ws, _) = connect_async(frontdoor.ws_url("/orders/3")).await.unwrap();
    frontdoor.wait_for_sessions(1).await;

    frontdoor.ctx.shutdown.trigger();

    assert_eq!(next_close_code(&mut ws).await, CloseCode::Away);

    let result = tokio::time::timeout(Duration::from_secs(5), frontdoor.handle)
        .await
        .expect("server should stop")
        .unwrap();
    assert!(result.is_ok());
    assert_eq!(frontdoor.ctx.tracker.active_count(), 0);
}
