//! Shared types for the chat core.

pub mod errors;

pub use errors::{ChatError, ChatResult, ConversionError, DispatchResult, UpstreamError};
