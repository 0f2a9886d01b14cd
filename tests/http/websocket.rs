//! WebSocket transport tests against a live listener

use crate::common::TestServer;
use futures::{SinkExt, StreamExt};
use serde_json::json;
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout, Duration};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const FRAME_TIMEOUT: Duration = Duration::from_millis(500);
const QUIET_PERIOD: Duration = Duration::from_millis(100);

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = connect_async(format!("ws://{addr}/api/ws")).await.unwrap();
    client
}

async fn next_message(client: &mut Client) -> Message {
    timeout(FRAME_TIMEOUT, client.next())
        .await
        .expect("Timeout waiting for a frame")
        .expect("Socket ended")
        .unwrap()
}

async fn next_json(client: &mut Client) -> serde_json::Value {
    let message = next_message(client).await;
    serde_json::from_str(message.to_text().unwrap()).unwrap()
}

async fn wait_for_subscribers(server: &TestServer, expected: usize) {
    timeout(FRAME_TIMEOUT, async {
        while server.manager.subscriber_count().await != expected {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("Subscriber count did not settle");
}

#[tokio::test]
async fn test_socket_gets_snapshot_then_one_frame_per_change() {
    let server = TestServer::new();
    server.json("POST", "/api/queue/join", Some("a")).await;
    server.json("POST", "/api/queue/join", Some("b")).await;
    let addr = server.listen().await;

    let mut client = connect(addr).await;
    assert_eq!(
        next_json(&mut client).await,
        json!({"total_in_queue": 2, "current_position": 0, "current_number": 2})
    );

    server.json("POST", "/api/queue/advance", None).await;
    assert_eq!(
        next_json(&mut client).await,
        json!({"total_in_queue": 2, "current_position": 1, "current_number": 2})
    );
    assert!(
        timeout(QUIET_PERIOD, client.next()).await.is_err(),
        "One advance should produce exactly one frame"
    );
}

#[tokio::test]
async fn test_text_ping_is_answered_in_band() {
    let server = TestServer::new();
    let addr = server.listen().await;

    let mut client = connect(addr).await;
    next_json(&mut client).await;

    client.send(Message::text("ping")).await.unwrap();
    assert_eq!(next_message(&mut client).await, Message::text("pong"));
    assert_eq!(server.manager.subscriber_count().await, 1);

    // Still subscribed after the keep-alive
    server.json("POST", "/api/queue/join", Some("late")).await;
    assert_eq!(next_json(&mut client).await["total_in_queue"], 1);
}

#[tokio::test]
async fn test_client_close_detaches_subscriber() {
    let server = TestServer::new();
    let addr = server.listen().await;

    let mut client = connect(addr).await;
    next_json(&mut client).await;
    assert_eq!(server.manager.subscriber_count().await, 1);

    client.close(None).await.unwrap();
    wait_for_subscribers(&server, 0).await;

    // Changes after the close reach nobody and nothing breaks
    let (_, body) = server.json("POST", "/api/queue/advance", None).await;
    assert_eq!(body["current_position"], 1);
}

#[tokio::test]
async fn test_dropped_connection_is_cleaned_up() {
    let server = TestServer::new();
    let addr = server.listen().await;

    let mut first = connect(addr).await;
    let mut second = connect(addr).await;
    next_json(&mut first).await;
    next_json(&mut second).await;
    wait_for_subscribers(&server, 2).await;

    drop(first);
    wait_for_subscribers(&server, 1).await;

    server.json("POST", "/api/queue/advance", None).await;
    assert_eq!(next_json(&mut second).await["current_position"], 1);
}

#[tokio::test]
async fn test_shutdown_closes_sockets_as_going_away() {
    let server = TestServer::new();
    let addr = server.listen().await;

    let mut client = connect(addr).await;
    next_json(&mut client).await;

    server.shutdown.trigger();
    match next_message(&mut client).await {
        Message::Close(Some(frame)) => assert_eq!(frame.code, CloseCode::Away),
        other => panic!("Expected a close frame, got {other:?}"),
    }
    wait_for_subscribers(&server, 0).await;
}
