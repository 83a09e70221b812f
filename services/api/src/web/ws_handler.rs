//! services/api/src/web/ws_handler.rs
//!
//! The WebSocket entry point. Each connection streams session snapshots to the
//! browser and forwards the browser's intents to the session actor.

use crate::{
    error::ApiError,
    web::{
        protocol::{ClientMessage, ServerMessage},
        state::AppState,
    },
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use chat_core::{Intent, IntentOutcome};
use futures::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

type WsSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(app_state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    info!("New WebSocket connection established.");

    // The sender is shared between the snapshot pump and the intent loop.
    let (sender, mut receiver) = socket.split();
    let ws_sender: WsSender = Arc::new(Mutex::new(sender));

    // --- 1. Snapshot Pump ---
    let mut snapshots = app_state.session.subscribe();
    let initial = snapshots.borrow_and_update().clone();
    if let Err(e) = send_message(&ws_sender, &ServerMessage::Snapshot(initial.into())).await {
        error!("Failed to send initial snapshot: {}", e);
        return;
    }

    let pump = {
        let ws_sender = ws_sender.clone();
        tokio::spawn(async move {
            while snapshots.changed().await.is_ok() {
                let snapshot = snapshots.borrow_and_update().clone();
                if let Err(e) =
                    send_message(&ws_sender, &ServerMessage::Snapshot(snapshot.into())).await
                {
                    warn!("Stopping snapshot pump: {}", e);
                    break;
                }
            }
        })
    };

    // --- 2. Main Message Loop ---
    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => {
                if let Err(e) = handle_text_message(text.as_str(), &app_state, &ws_sender).await {
                    error!("Failed to handle client message: {}", e);
                    break;
                }
            }
            Message::Close(_) => {
                info!("Client sent close message.");
                break;
            }
            _ => {}
        }
    }

    // --- 3. Cleanup ---
    pump.abort();
    info!("WebSocket connection closed.");
}

/// Parses one client message and applies it as an intent.
async fn handle_text_message(
    text: &str,
    app_state: &Arc<AppState>,
    ws_sender: &WsSender,
) -> Result<(), ApiError> {
    let client_msg = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!("Failed to deserialize client message: {}", e);
            let reply = ServerMessage::Error {
                message: format!("Unrecognized message: {}", e),
            };
            return send_message(ws_sender, &reply).await;
        }
    };

    let intent = Intent::from(client_msg);
    match app_state.session.apply(intent).await? {
        IntentOutcome::Created(id) => {
            let reply = ServerMessage::ConversationCreated {
                conversation_id: id.as_uuid(),
            };
            send_message(ws_sender, &reply).await
        }
        IntentOutcome::Accepted | IntentOutcome::Sent(_) | IntentOutcome::Ignored => Ok(()),
    }
}

async fn send_message(ws_sender: &WsSender, msg: &ServerMessage) -> Result<(), ApiError> {
    let json = serde_json::to_string(msg).map_err(|e| ApiError::Internal(e.to_string()))?;
    ws_sender
        .lock()
        .await
        .send(Message::Text(json.into()))
        .await?;
    Ok(())
}
