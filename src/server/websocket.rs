//! WebSocket transport for live queue updates
//!
//! Each socket becomes one relay subscriber. A writer task drains the
//! subscriber's channel into the socket; the reader loop answers
//! keep-alives and notices when the peer goes away. Server shutdown sends
//! a "going away" close frame.

use crate::notifications::api::{ChannelSink, Subscription};
use crate::queue::api::{QueueManager, QueueUpdate};
use crate::server::rate_limit::client_ip;
use crate::server::state::AppState;
use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Request, State};
use axum::response::Response;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

// How long the writer may take to flush a final close frame
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// `GET /api/ws`
pub async fn websocket_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    request: Request,
) -> Response {
    let peer = client_ip(&request);
    let manager = state.manager.clone();
    let shutdown = state.shutdown.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, manager, shutdown, peer))
}

async fn handle_socket(
    socket: WebSocket,
    manager: Arc<QueueManager>,
    mut shutdown: broadcast::Receiver<()>,
    peer: String,
) {
    let (ws_sender, mut ws_receiver) = socket.split();
    let (sink, updates) = ChannelSink::new(format!("ws:{peer}"));
    let evicted = sink.eviction_signal();
    let (reply_tx, reply_rx) = mpsc::unbounded_channel::<Message>();

    let mut subscription = Subscription::new(manager);
    let handle = match subscription.activate(Arc::new(sink)).await {
        Ok(handle) => handle,
        Err(e) => {
            log::error!("WebSocket subscription for {peer} failed: {e}");
            return;
        }
    };
    log::debug!("WebSocket subscriber {} connected from {peer}", handle.id());

    let mut writer = tokio::spawn(write_updates(ws_sender, updates, reply_rx));

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                let _ = reply_tx.send(Message::Close(Some(CloseFrame {
                    code: close_code::AWAY,
                    reason: "Server shutting down".into(),
                })));
                break;
            }
            _ = evicted.notified() => {
                log::debug!("WebSocket subscriber {} evicted by relay", handle.id());
                break;
            }
            msg = ws_receiver.next() => match msg {
                Some(Ok(Message::Text(text))) if text.as_str() == "ping" => {
                    if reply_tx.send(Message::Text("pong".into())).is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Ping(_))) => {
                    // axum queues the pong itself
                    log::trace!("Ping from {peer}");
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    log::debug!("WebSocket error from {peer}: {e}");
                    break;
                }
                Some(Ok(_)) => {}
            }
        }
    }

    subscription.close().await;
    drop(reply_tx);
    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut writer)
        .await
        .is_err()
    {
        writer.abort();
    }
    log::debug!(
        "WebSocket subscriber {} closed after {} updates in {:?}",
        handle.id(),
        handle.statistics().delivered(),
        handle.statistics().attached_at().elapsed()
    );
}

async fn write_updates(
    mut ws_sender: SplitSink<WebSocket, Message>,
    mut updates: mpsc::UnboundedReceiver<QueueUpdate>,
    mut replies: mpsc::UnboundedReceiver<Message>,
) {
    loop {
        let message = tokio::select! {
            // Replies first so a final close frame is not lost to a closed update channel
            biased;
            reply = replies.recv() => match reply {
                Some(reply) => reply,
                None => break,
            },
            update = updates.recv() => match update {
                Some(update) => match serde_json::to_string(&update) {
                    Ok(json) => Message::Text(json.into()),
                    Err(e) => {
                        log::error!("Failed to encode queue update: {e}");
                        continue;
                    }
                },
                None => break,
            },
        };

        if ws_sender.send(message).await.is_err() {
            break;
        }
    }
    // Dropping the receiver makes the next delivery fail and evicts the subscriber
}
