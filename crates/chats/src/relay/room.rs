use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use crate::entities::{ChatMessage, ParticipantId};

/// Identifier of one live connection to the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A conversation channel, keyed by the unordered pair of its participants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RoomKey {
    low: ParticipantId,
    high: ParticipantId,
}

impl RoomKey {
    /// Returns `None` when either participant is not known yet.
    pub fn new(a: &ParticipantId, b: &ParticipantId) -> Option<Self> {
        if a.is_empty() || b.is_empty() {
            return None;
        }

        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Some(Self {
            low: low.clone(),
            high: high.clone(),
        })
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.low, self.high)
    }
}

/// Events pushed to a connection's outbox
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    ReceiveMessage(ChatMessage),
}

pub(crate) type Outbox = mpsc::UnboundedSender<RelayEvent>;

/// Members of a single room; locked independently of every other room.
#[derive(Default)]
pub(crate) struct Room {
    pub(crate) members: Mutex<HashMap<ConnectionId, Outbox>>,
}
