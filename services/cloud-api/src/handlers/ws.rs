use std::collections::HashSet;

use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};
use types::source::source_key;
use types::SnapshotUpdate;

/// Client text frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionCommand {
    Subscribe(String),
    Unsubscribe(String),
}

impl SubscriptionCommand {
    /// Parse `subscribe:<sourceId>` / `unsubscribe:<sourceId>` (command case-insensitive).
    pub fn parse(text: &str) -> Option<Self> {
        let (command, source_id) = text.trim().split_once(':')?;
        let source_id = source_id.trim();
        if source_id.is_empty() {
            return None;
        }
        if command.eq_ignore_ascii_case("subscribe") {
            Some(Self::Subscribe(source_id.to_string()))
        } else if command.eq_ignore_ascii_case("unsubscribe") {
            Some(Self::Unsubscribe(source_id.to_string()))
        } else {
            None
        }
    }
}

/// `GET /v1/ws`
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let updates = state.notifier.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, updates))
}

async fn handle_socket(socket: WebSocket, mut updates: broadcast::Receiver<SnapshotUpdate>) {
    let (mut sender, mut receiver) = socket.split();
    let mut subscriptions: HashSet<String> = HashSet::new();

    loop {
        tokio::select! {
            incoming = receiver.next() => {
                let text = match incoming {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => continue,
                };
                let reply = match SubscriptionCommand::parse(text.as_str()) {
                    Some(SubscriptionCommand::Subscribe(source_id)) => {
                        subscriptions.insert(source_key(&source_id));
                        format!("subscribed:{}", source_id)
                    }
                    Some(SubscriptionCommand::Unsubscribe(source_id)) => {
                        subscriptions.remove(&source_key(&source_id));
                        format!("unsubscribed:{}", source_id)
                    }
                    None => "error:unknown_command".to_string(),
                };
                if sender.send(Message::Text(reply.into())).await.is_err() {
                    break;
                }
            }
            update = updates.recv() => {
                let update = match update {
                    Ok(update) => update,
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "WebSocket subscriber lagged, updates dropped");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                if !subscriptions.contains(&source_key(&update.source_id)) {
                    continue;
                }
                let frame = match serde_json::to_string(&update) {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!(error = %e, "Failed to encode snapshot update");
                        continue;
                    }
                };
                if sender.send(Message::Text(frame.into())).await.is_err() {
                    break;
                }
            }
        }
    }
}
