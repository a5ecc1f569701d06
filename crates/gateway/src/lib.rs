//! # SanketBani Gateway Crate
//!
//! HTTP and WebSocket surface of the SanketBani backend. The WebSocket endpoint
//! feeds the relay; the REST endpoints run conversion services through the
//! dispatcher.
//!
//! ## Architecture
//!
//! - **REST**: conversion services, health and the OpenAPI document
//! - **WebSocket**: realtime room chat
//! - **State**: shared relay and dispatcher
//! - **Middleware**: CORS and request logging
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sanketbani_gateway::{create_router, GatewayState};
//!
//! let app = create_router(GatewayState::new(relay, dispatcher));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod error;
pub mod middleware;
pub mod rest;
pub mod state;
pub mod websocket;

pub use error::{ErrorResponse, GatewayError, GatewayResult};
pub use state::GatewayState;

use axum::{middleware as axum_middleware, Router};
use std::sync::Arc;

/// Create the main application router with all routes
pub fn create_router(state: GatewayState) -> Router {
    let state = Arc::new(state);
    Router::new()
        // REST API routes
        .merge(rest::create_rest_routes())
        // WebSocket routes
        .merge(websocket::create_websocket_routes())
        .with_state(state)
        // CORS middleware
        .layer(middleware::create_cors_layer())
        // Logging middleware
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
}
