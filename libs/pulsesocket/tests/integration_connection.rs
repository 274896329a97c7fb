//! End-to-end tests over real WebSocket connections
//!
//! Each test starts a local server and drives a manager using the default
//! tungstenite connector.

mod common;

use common::{collector, next_event, MockWsServer};
use pulsesocket::{
    ConnectionManager, ConnectionState, ConnectionStatus, FixedDelay, JsonDecoder, SocketEvent,
};
use serde_json::{json, Value};
use std::time::Duration;

fn manager(url: String) -> ConnectionManager<JsonDecoder> {
    pulsesocket::builder()
        .url(url)
        .decoder(JsonDecoder)
        .reconnect_strategy(FixedDelay::new(Duration::from_millis(100), Some(2)))
        .connect_timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_basic_connection_and_greeting() {
    let server = MockWsServer::start(Some(
        json!({"type": "user:created", "data": {"message": "welcome"}}).to_string(),
    ))
    .await;
    verbose_println!("Mock server started at {}", server.ws_url());

    let manager = manager(server.ws_url());
    let (events, mut rx) = collector();
    let _sub = manager.subscribe(events);

    manager.connect();

    let status = next_event(&mut rx).await;
    assert!(status.as_status().unwrap().is_connected());
    assert_eq!(manager.state(), ConnectionState::Open);

    let greeting = next_event(&mut rx).await;
    let value = greeting.as_message().unwrap();
    assert_eq!(value["type"], "user:created");
    assert_eq!(value["data"]["message"], "welcome");

    manager.close().await;
    assert_eq!(manager.state(), ConnectionState::Idle);
    assert_eq!(server.connection_count(), 1);
}

#[tokio::test]
async fn test_send_round_trips_through_echo() {
    let server = MockWsServer::start(None).await;
    let manager = manager(server.ws_url());
    let (events, mut rx) = collector();
    let _sub = manager.subscribe(events);

    manager.connect();
    assert!(next_event(&mut rx).await.as_status().unwrap().is_connected());

    let sent = manager
        .send(&json!({"type": "user:updated", "message": "echo me"}))
        .unwrap();
    assert!(sent);

    let echoed: Value = match next_event(&mut rx).await {
        SocketEvent::Message(value) => value,
        other => panic!("expected echoed message, got {:?}", other),
    };
    assert_eq!(echoed["message"], "echo me");

    let metrics = manager.metrics();
    verbose_println!("Metrics: {:?}", metrics);
    assert_eq!(metrics.messages_sent, 1);
    assert_eq!(metrics.messages_received, 1);

    manager.close().await;
}

#[tokio::test]
async fn test_server_shutdown_reports_disconnect() {
    let server = MockWsServer::start(None).await;
    let manager = manager(server.ws_url());
    let (events, mut rx) = collector();
    let _sub = manager.subscribe(events);

    manager.connect();
    assert!(next_event(&mut rx).await.as_status().unwrap().is_connected());

    server.shutdown();

    let status = next_event(&mut rx).await;
    let envelope = status.as_status().unwrap();
    assert_eq!(envelope.status, ConnectionStatus::Disconnected);
    assert_eq!(envelope.message, "Disconnected from server");

    manager.close().await;
}

#[tokio::test]
async fn test_unreachable_endpoint_gives_up() {
    // Bind and drop a listener to get a port nobody is listening on
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let manager = manager(format!("ws://{}", addr));
    let (events, mut rx) = collector();
    let _sub = manager.subscribe(events);

    manager.connect();

    let mut last = String::new();
    while manager.state() != ConnectionState::Terminal || !last.starts_with("Max") {
        let event = next_event(&mut rx).await;
        let envelope = event.as_status().unwrap();
        assert_eq!(envelope.status, ConnectionStatus::Error);
        last = envelope.message.clone();
    }

    assert_eq!(last, "Max reconnection attempts reached");
    assert_eq!(manager.retry_attempts(), 2);
}
