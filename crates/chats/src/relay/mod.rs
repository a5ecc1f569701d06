//! Realtime relay.
//!
//! Connections register with [`Relay::connect`], join rooms keyed by a pair of
//! participants and receive every [`ChatMessage`] sent to those rooms through
//! their own FIFO outbox. The relay never looks at message content.
//!
//! Lock order is `connections` → `rooms` → a single room's members. Broadcasts
//! only take the room map for reading, so traffic in one room does not wait on
//! another.

pub mod room;

pub use room::{ConnectionId, RelayEvent, RoomKey};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, trace};

use crate::entities::{ChatMessage, ParticipantId};
use room::{Outbox, Room};
use sanketbani_config::RelayConfig;

struct ConnectionEntry {
    outbox: Outbox,
    rooms: HashSet<RoomKey>,
}

/// Receiving half of a relay connection
#[derive(Debug)]
pub struct RelayConnection {
    id: ConnectionId,
    events: mpsc::UnboundedReceiver<RelayEvent>,
}

impl RelayConnection {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Next event for this connection; `None` once the relay dropped it.
    pub async fn recv(&mut self) -> Option<RelayEvent> {
        self.events.recv().await
    }

    pub fn try_recv(&mut self) -> Option<RelayEvent> {
        self.events.try_recv().ok()
    }
}

pub struct Relay {
    connections: RwLock<HashMap<ConnectionId, ConnectionEntry>>,
    rooms: RwLock<HashMap<RoomKey, Arc<Room>>>,
    echo_to_sender: bool,
}

impl Relay {
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            rooms: RwLock::new(HashMap::new()),
            echo_to_sender: config.echo_to_sender,
        }
    }

    /// Register a new connection with an empty room set
    pub async fn connect(&self) -> RelayConnection {
        let id = ConnectionId::generate();
        let (outbox, events) = mpsc::unbounded_channel();

        self.connections.write().await.insert(
            id,
            ConnectionEntry {
                outbox,
                rooms: HashSet::new(),
            },
        );

        info!(connection = %id, "relay connection opened");
        RelayConnection { id, events }
    }

    /// Put `connection` in the room of `a` and `b`.
    ///
    /// Returns the room joined, or `None` when either id is empty or the
    /// connection is unknown. Joining the same room again changes nothing.
    pub async fn join_room(
        &self,
        connection: ConnectionId,
        a: &ParticipantId,
        b: &ParticipantId,
    ) -> Option<RoomKey> {
        let Some(key) = RoomKey::new(a, b) else {
            trace!(%connection, "join ignored, participant not resolved yet");
            return None;
        };

        let mut connections = self.connections.write().await;
        let Some(entry) = connections.get_mut(&connection) else {
            debug!(%connection, room = %key, "join ignored, connection is not registered");
            return None;
        };

        if !entry.rooms.insert(key.clone()) {
            return Some(key);
        }

        let mut rooms = self.rooms.write().await;
        let room = rooms.entry(key.clone()).or_default().clone();
        room.members
            .lock()
            .await
            .insert(connection, entry.outbox.clone());

        debug!(%connection, room = %key, "connection joined room");
        Some(key)
    }

    /// Deliver `message` to every connection in the room of its sender and
    /// recipient, returning how many outboxes accepted it.
    ///
    /// `from` is the sending connection; it is skipped when echo is disabled.
    pub async fn send_message(&self, from: ConnectionId, message: ChatMessage) -> usize {
        let Some(key) = message.room_key() else {
            trace!(connection = %from, "message dropped, participant not resolved yet");
            return 0;
        };

        let room = match self.rooms.read().await.get(&key) {
            Some(room) => room.clone(),
            None => {
                trace!(room = %key, "message dropped, nobody in room");
                return 0;
            }
        };

        let mut members = room.members.lock().await;
        let mut delivered = 0;
        let mut closed = Vec::new();

        for (id, outbox) in members.iter() {
            if *id == from && !self.echo_to_sender {
                continue;
            }
            match outbox.send(RelayEvent::ReceiveMessage(message.clone())) {
                Ok(()) => delivered += 1,
                Err(_) => closed.push(*id),
            }
        }

        for id in &closed {
            debug!(connection = %id, room = %key, "pruning closed connection");
            members.remove(id);
        }
        let emptied = !closed.is_empty() && members.is_empty();
        drop(members);

        if emptied {
            self.drop_room_if_empty(&key, &room).await;
        }

        trace!(room = %key, delivered, "message relayed");
        delivered
    }

    // Called without the room lock held, so `rooms` is taken before the room mutex.
    async fn drop_room_if_empty(&self, key: &RoomKey, room: &Arc<Room>) {
        let mut rooms = self.rooms.write().await;
        let stale = match rooms.get(key) {
            Some(current) => {
                Arc::ptr_eq(current, room) && current.members.lock().await.is_empty()
            }
            None => false,
        };
        if stale {
            rooms.remove(key);
            debug!(room = %key, "removed room with no live members");
        }
    }

    /// Take `connection` out of one room. Unknown rooms and connections are ignored.
    pub async fn leave_room(
        &self,
        connection: ConnectionId,
        a: &ParticipantId,
        b: &ParticipantId,
    ) -> bool {
        let Some(key) = RoomKey::new(a, b) else {
            return false;
        };

        let mut connections = self.connections.write().await;
        let was_member = connections
            .get_mut(&connection)
            .map(|entry| entry.rooms.remove(&key))
            .unwrap_or(false);

        let mut rooms = self.rooms.write().await;
        let removed = Self::remove_member(&mut rooms, &key, connection).await;
        debug!(%connection, room = %key, "connection left room");
        was_member || removed
    }

    /// Drop `connection` from every room and close its outbox.
    ///
    /// Returns the number of rooms it was in.
    pub async fn disconnect(&self, connection: ConnectionId) -> usize {
        let mut connections = self.connections.write().await;
        let Some(entry) = connections.remove(&connection) else {
            return 0;
        };

        let mut rooms = self.rooms.write().await;
        for key in &entry.rooms {
            Self::remove_member(&mut rooms, key, connection).await;
        }

        info!(%connection, rooms = entry.rooms.len(), "relay connection closed");
        entry.rooms.len()
    }

    async fn remove_member(
        rooms: &mut HashMap<RoomKey, Arc<Room>>,
        key: &RoomKey,
        connection: ConnectionId,
    ) -> bool {
        let Some(room) = rooms.get(key).cloned() else {
            return false;
        };

        let mut members = room.members.lock().await;
        let removed = members.remove(&connection).is_some();
        if members.is_empty() {
            rooms.remove(key);
        }
        removed
    }

    /// Connections currently joined to `key`
    pub async fn room_members(&self, key: &RoomKey) -> Vec<ConnectionId> {
        let room = match self.rooms.read().await.get(key) {
            Some(room) => room.clone(),
            None => return Vec::new(),
        };
        let members = room.members.lock().await;
        members.keys().copied().collect()
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Forget every room and connection. Open receivers observe end-of-stream.
    pub async fn shutdown(&self) {
        let mut connections = self.connections.write().await;
        let mut rooms = self.rooms.write().await;
        let closed = connections.len();
        rooms.clear();
        connections.clear();
        info!(connections = closed, "relay shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::MessageContent;

    fn relay() -> Relay {
        Relay::new(&RelayConfig::default())
    }

    fn pid(id: &str) -> ParticipantId {
        ParticipantId::from(id)
    }

    fn text(sender: &str, recipient: &str, body: &str) -> ChatMessage {
        ChatMessage::new(sender, recipient, MessageContent::from_text(body).unwrap()).unwrap()
    }

    fn drain(connection: &mut RelayConnection) -> Vec<ChatMessage> {
        let mut received = Vec::new();
        while let Some(RelayEvent::ReceiveMessage(message)) = connection.try_recv() {
            received.push(message);
        }
        received
    }

    #[tokio::test]
    async fn message_reaches_joined_peer_exactly_once() {
        let relay = relay();
        let mut a = relay.connect().await;
        let mut b = relay.connect().await;
        let mut c = relay.connect().await;

        relay.join_room(a.id(), &pid("A"), &pid("B")).await;
        relay.join_room(b.id(), &pid("B"), &pid("A")).await;

        let delivered = relay.send_message(a.id(), text("A", "B", "hello")).await;
        assert_eq!(delivered, 2);

        let at_b = drain(&mut b);
        assert_eq!(at_b.len(), 1);
        assert_eq!(at_b[0].content().text(), Some("hello"));
        assert_eq!(drain(&mut a).len(), 1, "sender gets its echo");
        assert!(drain(&mut c).is_empty());
    }

    #[tokio::test]
    async fn messages_from_one_sender_arrive_in_order() {
        let relay = relay();
        let a = relay.connect().await;
        let mut b = relay.connect().await;
        relay.join_room(a.id(), &pid("A"), &pid("B")).await;
        relay.join_room(b.id(), &pid("A"), &pid("B")).await;

        for i in 0..50 {
            relay
                .send_message(a.id(), text("A", "B", &format!("m{i}")))
                .await;
        }

        let bodies: Vec<String> = drain(&mut b)
            .iter()
            .filter_map(|m| m.content().text().map(str::to_string))
            .collect();
        let expected: Vec<String> = (0..50).map(|i| format!("m{i}")).collect();
        assert_eq!(bodies, expected);
    }

    #[tokio::test]
    async fn joining_twice_has_no_extra_effect() {
        let relay = relay();
        let mut b = relay.connect().await;
        let key = relay.join_room(b.id(), &pid("A"), &pid("B")).await.unwrap();
        relay.join_room(b.id(), &pid("A"), &pid("B")).await;

        assert_eq!(relay.room_members(&key).await, vec![b.id()]);

        relay
            .send_message(b.id(), text("A", "B", "once"))
            .await;
        assert_eq!(drain(&mut b).len(), 1);
    }

    #[tokio::test]
    async fn join_with_empty_participant_is_a_no_op() {
        let relay = relay();
        let a = relay.connect().await;

        assert!(relay.join_room(a.id(), &pid(""), &pid("B")).await.is_none());
        assert!(relay.join_room(a.id(), &pid("A"), &pid("")).await.is_none());
        assert_eq!(relay.room_count().await, 0);
    }

    #[tokio::test]
    async fn leaving_excludes_connection_from_later_sends() {
        let relay = relay();
        let a = relay.connect().await;
        let mut b = relay.connect().await;
        relay.join_room(a.id(), &pid("A"), &pid("B")).await;
        relay.join_room(b.id(), &pid("A"), &pid("B")).await;

        assert!(relay.leave_room(b.id(), &pid("B"), &pid("A")).await);
        relay.send_message(a.id(), text("A", "B", "gone")).await;

        assert!(drain(&mut b).is_empty());
    }

    #[tokio::test]
    async fn leaving_without_joining_is_harmless() {
        let relay = relay();
        let a = relay.connect().await;

        assert!(!relay.leave_room(a.id(), &pid("A"), &pid("B")).await);
        assert!(!relay.leave_room(a.id(), &pid(""), &pid("B")).await);
        assert_eq!(relay.disconnect(ConnectionId::generate()).await, 0);
    }

    #[tokio::test]
    async fn disconnect_leaves_all_rooms_and_removes_empty_ones() {
        let relay = relay();
        let mut a = relay.connect().await;
        relay.join_room(a.id(), &pid("A"), &pid("B")).await;
        relay.join_room(a.id(), &pid("A"), &pid("C")).await;
        assert_eq!(relay.room_count().await, 2);

        assert_eq!(relay.disconnect(a.id()).await, 2);
        assert_eq!(relay.room_count().await, 0);
        assert_eq!(relay.connection_count().await, 0);
        assert!(a.recv().await.is_none());
    }

    #[tokio::test]
    async fn echo_can_be_disabled() {
        let relay = Relay::new(&RelayConfig {
            echo_to_sender: false,
        });
        let mut a = relay.connect().await;
        let mut b = relay.connect().await;
        relay.join_room(a.id(), &pid("A"), &pid("B")).await;
        relay.join_room(b.id(), &pid("A"), &pid("B")).await;

        assert_eq!(relay.send_message(a.id(), text("A", "B", "hi")).await, 1);
        assert!(drain(&mut a).is_empty());
        assert_eq!(drain(&mut b).len(), 1);
    }

    #[tokio::test]
    async fn send_to_room_without_members_is_dropped() {
        let relay = relay();
        let a = relay.connect().await;
        assert_eq!(relay.send_message(a.id(), text("A", "B", "hi")).await, 0);
    }

    #[tokio::test]
    async fn dropped_receivers_are_pruned() {
        let relay = relay();
        let a = relay.connect().await;
        let b = relay.connect().await;
        let key = relay.join_room(a.id(), &pid("A"), &pid("B")).await.unwrap();
        relay.join_room(b.id(), &pid("A"), &pid("B")).await;
        let b_id = b.id();
        drop(b);

        assert_eq!(relay.send_message(a.id(), text("A", "B", "hi")).await, 1);
        assert_eq!(relay.room_members(&key).await, vec![a.id()]);
        assert!(!relay.room_members(&key).await.contains(&b_id));
    }

    #[tokio::test]
    async fn room_is_removed_once_every_receiver_is_gone() {
        let relay = relay();
        let a = relay.connect().await;
        let b = relay.connect().await;
        let key = relay.join_room(a.id(), &pid("A"), &pid("B")).await.unwrap();
        relay.join_room(b.id(), &pid("A"), &pid("B")).await;
        let a_id = a.id();
        drop(a);
        drop(b);

        assert_eq!(relay.send_message(a_id, text("A", "B", "hi")).await, 0);
        assert_eq!(relay.room_count().await, 0);
        assert!(relay.room_members(&key).await.is_empty());

        let c = relay.connect().await;
        relay.join_room(c.id(), &pid("B"), &pid("A")).await;
        assert_eq!(relay.room_members(&key).await, vec![c.id()]);
    }

    #[tokio::test]
    async fn shutdown_closes_every_connection() {
        let relay = relay();
        let mut a = relay.connect().await;
        relay.join_room(a.id(), &pid("A"), &pid("B")).await;

        relay.shutdown().await;

        assert!(a.recv().await.is_none());
        assert_eq!(relay.room_count().await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn unrelated_rooms_relay_concurrently() {
        let relay = Arc::new(relay());
        let mut handles = Vec::new();

        for room in 0..16 {
            let relay = relay.clone();
            handles.push(tokio::spawn(async move {
                let sender = pid(&format!("s{room}"));
                let recipient = pid(&format!("r{room}"));
                let a = relay.connect().await;
                let mut b = relay.connect().await;
                relay.join_room(a.id(), &sender, &recipient).await;
                relay.join_room(b.id(), &sender, &recipient).await;

                for i in 0..20 {
                    let message = ChatMessage::new(
                        sender.clone(),
                        recipient.clone(),
                        MessageContent::from_text(format!("{i}")).unwrap(),
                    )
                    .unwrap();
                    relay.send_message(a.id(), message).await;
                }

                let mut seen = Vec::new();
                while let Some(RelayEvent::ReceiveMessage(message)) = b.try_recv() {
                    assert_eq!(message.sender(), &sender);
                    seen.push(message.content().text().unwrap_or_default().to_string());
                }
                seen
            }));
        }

        for handle in handles {
            let seen = handle.await.unwrap();
            let expected: Vec<String> = (0..20).map(|i| i.to_string()).collect();
            assert_eq!(seen, expected);
        }
    }
}
