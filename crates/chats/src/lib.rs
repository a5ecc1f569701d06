//! # SanketBani Chats Crate
//!
//! Core of the SanketBani chat backend: the realtime relay that routes messages
//! between the two participants of a room, and the dispatcher that runs the
//! conversion services (translation, speech-to-text, image-to-ISL, ...).
//!
//! ## Architecture
//!
//! - **Entities**: message content and chat messages
//! - **Relay**: rooms, connections and fan-out
//! - **Services**: service catalog and dispatcher
//! - **Types**: error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sanketbani_chats::{ConversionRequest, Dispatcher, MessageContent};
//!
//! let dispatcher = Dispatcher::new(provider, Duration::from_secs(30));
//! let request = ConversionRequest::new("alice", MessageContent::from_text("hello")?, "textTranslate");
//! let result = dispatcher.dispatch(&request).await?;
//! ```

pub mod entities;
pub mod relay;
pub mod services;
pub mod types;

pub use entities::{ChatMessage, MediaKind, MediaRef, MessageContent, ParticipantId};
pub use relay::{ConnectionId, Relay, RelayConnection, RelayEvent, RoomKey};
pub use services::{
    Capability, CatalogEntry, ConversionRequest, ConversionResult, Dispatcher, InputKind,
    ResultKind, ServiceCatalog, ServiceName,
};
pub use types::{ChatError, ChatResult, ConversionError, DispatchResult, UpstreamError};
