//! Chat WebSocket handlers

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use sanketbani_chats::{
    ChatMessage, ConnectionId, ParticipantId, Relay, RelayConnection, RelayEvent, RoomKey,
};

use crate::state::GatewayState;

/// Participants naming a room
#[derive(Debug, Clone, Deserialize)]
pub struct RoomRequest {
    #[serde(default)]
    pub sender: ParticipantId,
    #[serde(default)]
    pub recipient: ParticipantId,
}

/// Client events received from WebSocket
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ClientEvent {
    JoinRoom(RoomRequest),
    SendMessage(ChatMessage),
    LeaveRoom(RoomRequest),
    /// Heartbeat to keep connection alive
    Ping,
}

/// Server events sent to WebSocket clients
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ServerEvent {
    ReceiveMessage(ChatMessage),
    Joined { room: String },
    Left { room: String },
    Pong,
    Error { error: String, message: String },
}

impl ServerEvent {
    fn error(error: &str, message: impl Into<String>) -> Self {
        ServerEvent::Error {
            error: error.to_string(),
            message: message.into(),
        }
    }
}

/// Chat WebSocket connection handler
pub async fn chat_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<GatewayState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_chat_websocket(socket, state))
}

/// Handle chat WebSocket connection
async fn handle_chat_websocket(socket: WebSocket, state: Arc<GatewayState>) {
    let (mut sender, mut receiver) = socket.split();

    let connection = state.relay.connect().await;
    let connection_id = connection.id();

    // Replies meant for this socket only
    let (reply_tx, reply_rx) = mpsc::unbounded_channel();

    let mut send_task = tokio::spawn(async move {
        let mut outgoing = Outgoing {
            connection,
            replies: reply_rx,
        };
        while let Some(event) = outgoing.next().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(error) => {
                    warn!(%error, "failed to encode server event");
                    continue;
                }
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    let relay = state.relay.clone();
    let mut receive_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            match message {
                Message::Text(text) => {
                    if let Some(reply) = handle_client_frame(&relay, connection_id, &text).await {
                        if reply_tx.send(reply).is_err() {
                            break;
                        }
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut send_task => receive_task.abort(),
        _ = &mut receive_task => send_task.abort(),
    }

    // Clean up connection
    let rooms = state.relay.disconnect(connection_id).await;
    debug!(connection = %connection_id, rooms, "chat websocket closed");
}

/// Events waiting to be written to one socket
struct Outgoing {
    connection: RelayConnection,
    replies: mpsc::UnboundedReceiver<ServerEvent>,
}

impl Outgoing {
    /// Next event to send; `None` once the relay closed this connection.
    async fn next(&mut self) -> Option<ServerEvent> {
        tokio::select! {
            Some(reply) = self.replies.recv() => Some(reply),
            event = self.connection.recv() => match event? {
                RelayEvent::ReceiveMessage(message) => Some(ServerEvent::ReceiveMessage(message)),
            },
        }
    }
}

/// Apply one text frame to the relay, returning the reply for the sender, if any.
///
/// Joins and leaves naming a participant that is not resolved yet get no reply.
async fn handle_client_frame(
    relay: &Relay,
    connection: ConnectionId,
    frame: &str,
) -> Option<ServerEvent> {
    let event = match serde_json::from_str::<ClientEvent>(frame) {
        Ok(event) => event,
        Err(error) => {
            debug!(%connection, %error, "malformed client frame");
            return Some(ServerEvent::error("INVALID_FRAME", error.to_string()));
        }
    };

    match event {
        ClientEvent::Ping => Some(ServerEvent::Pong),
        ClientEvent::JoinRoom(room) => relay
            .join_room(connection, &room.sender, &room.recipient)
            .await
            .map(|key| ServerEvent::Joined {
                room: key.to_string(),
            }),
        ClientEvent::LeaveRoom(room) => {
            // Participant ids arrive asynchronously; until both are known this is a no-op.
            let Some(key) = RoomKey::new(&room.sender, &room.recipient) else {
                trace!(%connection, "leave ignored, participant not resolved yet");
                return None;
            };
            relay
                .leave_room(connection, &room.sender, &room.recipient)
                .await;
            Some(ServerEvent::Left {
                room: key.to_string(),
            })
        }
        ClientEvent::SendMessage(message) => {
            let delivered = relay.send_message(connection, message).await;
            debug!(%connection, delivered, "chat message relayed");
            None
        }
    }
}
