//! Domain entities shared by the relay and the dispatcher.

pub mod content;
pub mod message;

pub use content::{MediaKind, MediaRef, MessageContent};
pub use message::{ChatMessage, ParticipantId};
