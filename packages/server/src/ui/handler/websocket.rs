//! WebSocket connection handlers.

use std::{sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, PushFrame},
    infrastructure::dto::websocket::decode_client_event,
    ui::state::AppState,
    usecase::DispatcherHandle,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives frames from the rx channel and pushes them to the WebSocket sender.
///
/// This function handles the outbound flow: events queued by the dispatcher (via rx channel)
/// are written to this client's WebSocket connection. It also pings the client every
/// `ping_interval` so that the client keeps sending frames while idle.
///
/// # Arguments
///
/// * `rx` - Channel receiver for frames queued by the dispatcher
/// * `sender` - WebSocket sink to send messages to this client
/// * `ping_interval` - Interval between pings
///
/// # Returns
///
/// A `JoinHandle` for the spawned task
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<PushFrame>,
    mut sender: SplitSink<WebSocket, Message>,
    ping_interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(ping_interval);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                frame = rx.recv() => {
                    let Some(frame) = frame else { break };
                    match frame {
                        PushFrame::Text(content) => {
                            if sender.send(Message::Text(content.into())).await.is_err() {
                                break;
                            }
                        }
                        PushFrame::Close(reason) => {
                            let close = CloseFrame {
                                code: close_code::POLICY,
                                reason: Utf8Bytes::from_static(reason.as_str()),
                            };
                            let _ = sender.send(Message::Close(Some(close))).await;
                            break;
                        }
                    }
                }
                _ = ticker.tick() => {
                    if sender.send(Message::Ping(Bytes::new())).await.is_err() {
                        break;
                    }
                }
            }
        }
    })
}

/// Spawns a task that decodes frames from this client and forwards them to the dispatcher.
///
/// The task ends when the client closes the socket, a read error occurs, or nothing
/// arrives within `idle_timeout`.
fn receiver_loop(
    mut receiver: SplitStream<WebSocket>,
    dispatcher: DispatcherHandle,
    connection: ConnectionId,
    idle_timeout: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let msg = match tokio::time::timeout(idle_timeout, receiver.next()).await {
                Ok(Some(Ok(msg))) => msg,
                Ok(Some(Err(e))) => {
                    tracing::warn!("WebSocket error on '{}': {}", connection, e);
                    break;
                }
                Ok(None) => break,
                Err(_) => {
                    tracing::info!(
                        "Connection '{}' timed out after {:?} without traffic",
                        connection,
                        idle_timeout
                    );
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received text from '{}': {}", connection, text.as_str());

                    let event = match decode_client_event(text.as_str()) {
                        Ok(event) => event,
                        Err(e) => {
                            tracing::warn!("Ignoring frame from '{}': {}", connection, e);
                            continue;
                        }
                    };

                    if dispatcher.dispatch(connection.clone(), event.into()).is_err() {
                        tracing::error!("Dispatcher closed, dropping connection '{}'", connection);
                        break;
                    }
                }
                Message::Close(_) => {
                    tracing::debug!("Client '{}' requested close", connection);
                    break;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                _ => {}
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection = ConnectionId::generate();

    // Create a channel for this client to receive frames from the dispatcher
    let (tx, rx) = mpsc::unbounded_channel();
    if let Err(e) = state.dispatcher.connect(connection.clone(), tx) {
        tracing::error!("Failed to register connection '{}': {}", connection, e);
        return;
    }
    tracing::info!("New connection '{}'", connection);

    let (sender, receiver) = socket.split();

    let mut send_task = pusher_loop(rx, sender, state.config.ping_interval);
    let mut recv_task = receiver_loop(
        receiver,
        state.dispatcher.clone(),
        connection.clone(),
        state.config.idle_timeout(),
    );

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    if let Err(e) = state.dispatcher.disconnect(connection.clone()) {
        tracing::warn!("Failed to report disconnect of '{}': {}", connection, e);
    }
    tracing::debug!("Connection '{}' closed", connection);
}
