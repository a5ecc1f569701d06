//! REST API endpoints for the gateway

pub mod docs;
pub mod health;
pub mod services;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::state::GatewayState;

/// Create all REST API routes
pub fn create_rest_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/health", get(health::health_check))
        // Conversion services
        .merge(services::create_service_routes())
        // OpenAPI document
        .route("/api-docs/openapi.json", get(docs::openapi_json))
}
