//! Shared application state for the gateway

use std::sync::Arc;

use sanketbani_chats::{Dispatcher, Relay};

/// Services every handler can reach
#[derive(Clone)]
pub struct GatewayState {
    /// Realtime relay shared by all WebSocket connections
    pub relay: Arc<Relay>,
    /// Conversion service dispatcher
    pub dispatcher: Arc<Dispatcher>,
}

impl GatewayState {
    pub fn new(relay: Arc<Relay>, dispatcher: Arc<Dispatcher>) -> Self {
        Self { relay, dispatcher }
    }
}
