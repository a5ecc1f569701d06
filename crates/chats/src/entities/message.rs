use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::content::MessageContent;
use crate::relay::RoomKey;
use crate::types::{ChatError, ChatResult};

/// Opaque identifier of a conversation participant, resolved outside this crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Envelope relayed between two participants.
///
/// Immutable once built; deserialisation runs the same content check as [`ChatMessage::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawChatMessage")]
pub struct ChatMessage {
    sender: ParticipantId,
    recipient: ParticipantId,
    content: MessageContent,
    timestamp: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawChatMessage {
    sender: ParticipantId,
    recipient: ParticipantId,
    content: MessageContent,
    #[serde(default = "Utc::now")]
    timestamp: DateTime<Utc>,
}

impl TryFrom<RawChatMessage> for ChatMessage {
    type Error = ChatError;

    fn try_from(raw: RawChatMessage) -> Result<Self, Self::Error> {
        Self::with_timestamp(raw.sender, raw.recipient, raw.content, raw.timestamp)
    }
}

impl ChatMessage {
    /// Create a message stamped with the current time
    pub fn new(
        sender: impl Into<ParticipantId>,
        recipient: impl Into<ParticipantId>,
        content: MessageContent,
    ) -> ChatResult<Self> {
        Self::with_timestamp(sender, recipient, content, Utc::now())
    }

    pub fn with_timestamp(
        sender: impl Into<ParticipantId>,
        recipient: impl Into<ParticipantId>,
        content: MessageContent,
        timestamp: DateTime<Utc>,
    ) -> ChatResult<Self> {
        content.validate()?;
        Ok(Self {
            sender: sender.into(),
            recipient: recipient.into(),
            content,
            timestamp,
        })
    }

    pub fn sender(&self) -> &ParticipantId {
        &self.sender
    }

    pub fn recipient(&self) -> &ParticipantId {
        &self.recipient
    }

    pub fn content(&self) -> &MessageContent {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Room this message is addressed to, if both ends are known
    pub fn room_key(&self) -> Option<RoomKey> {
        RoomKey::new(&self.sender, &self.recipient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_message_with_empty_content_is_rejected() {
        let result = serde_json::from_value::<ChatMessage>(json!({
            "sender": "a",
            "recipient": "b",
            "content": { "message": "", "mediaUrl": { "url": "", "type": "" } },
            "timestamp": "2024-12-07T10:00:00Z"
        }));

        let err = result.unwrap_err().to_string();
        assert!(err.contains("text or a media url"), "unexpected error: {err}");
    }

    #[test]
    fn wire_message_round_trips_timestamp() {
        let message: ChatMessage = serde_json::from_value(json!({
            "sender": "a",
            "recipient": "b",
            "content": { "message": "Hello" },
            "timestamp": "2024-12-07T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(message.content().text(), Some("Hello"));
        assert_eq!(message.timestamp().to_rfc3339(), "2024-12-07T10:00:00+00:00");

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["content"]["message"], "Hello");
        assert_eq!(value["sender"], "a");
    }

    #[test]
    fn room_key_needs_both_participants() {
        let content = MessageContent::from_text("hi").unwrap();
        let message = ChatMessage::new("a", "", content).unwrap();
        assert!(message.room_key().is_none());
    }
}
