//! Conversion service endpoints

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use sanketbani_chats::{
    ConversionRequest, ConversionResult, InputKind, MessageContent, ParticipantId, ResultKind,
    ServiceName,
};

use crate::error::{ErrorResponse, GatewayResult};
use crate::state::GatewayState;

/// Body of `POST /api/v1/chat/services`.
///
/// Accepts both the camelCase field names and the `userId`/`selectedService`
/// names older clients send.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    #[serde(default, alias = "userId")]
    #[schema(example = "alice")]
    pub requester_id: Option<String>,
    /// `{"message": ...}` or `{"mediaUrl": {"url": ..., "type": "image"|"audio"|"video"}}`;
    /// `text` and `media` are accepted too
    #[serde(default)]
    #[schema(value_type = Object)]
    pub content: MessageContent,
    #[serde(default, alias = "selectedService")]
    #[schema(example = "textTranslate")]
    pub requested_service: Option<String>,
}

impl From<ServiceRequest> for ConversionRequest {
    fn from(request: ServiceRequest) -> Self {
        ConversionRequest {
            requester_id: request.requester_id.map(ParticipantId::from),
            content: request.content,
            requested_service: request.requested_service,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceResponse {
    #[schema(example = "success")]
    pub status: String,
    /// `{"payload": string|null, "resultKind": "text"|"video"|"audio"}`
    #[schema(value_type = Object)]
    pub data: ConversionResult,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogService {
    #[schema(value_type = String)]
    pub service: ServiceName,
    #[schema(value_type = String)]
    pub result_kind: ResultKind,
    /// `false` while the service only reports its result kind
    pub available: bool,
}

/// Services accepted for one kind of input
#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogGroup {
    #[schema(value_type = String)]
    pub input: InputKind,
    pub services: Vec<CatalogService>,
}

/// Create conversion service routes
pub fn create_service_routes() -> Router<Arc<GatewayState>> {
    Router::new().route("/api/v1/chat/services", get(list_services).post(run_service))
}

#[utoipa::path(
    post,
    path = "/api/v1/chat/services",
    tag = "Services",
    request_body = ServiceRequest,
    responses(
        (status = 200, description = "Conversion result", body = ServiceResponse),
        (status = 400, description = "Missing fields or unsupported service/media", body = ErrorResponse),
        (status = 502, description = "Conversion provider failed", body = ErrorResponse)
    )
)]
pub async fn run_service(
    State(state): State<Arc<GatewayState>>,
    payload: Result<Json<ServiceRequest>, JsonRejection>,
) -> GatewayResult<Json<ServiceResponse>> {
    let Json(payload) = payload?;
    let request = ConversionRequest::from(payload);
    debug!(service = ?request.requested_service, "conversion requested");

    let data = state.dispatcher.dispatch(&request).await?;
    Ok(Json(ServiceResponse {
        status: "success".to_string(),
        data,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/chat/services",
    tag = "Services",
    responses(
        (status = 200, description = "Services grouped by input kind", body = Vec<CatalogGroup>)
    )
)]
pub async fn list_services(State(state): State<Arc<GatewayState>>) -> Json<Vec<CatalogGroup>> {
    let entries = state.dispatcher.catalog().entries();
    let groups = InputKind::ALL
        .into_iter()
        .map(|input| CatalogGroup {
            input,
            services: entries
                .iter()
                .filter(|entry| entry.input == input)
                .map(|entry| CatalogService {
                    service: entry.service,
                    result_kind: entry.result_kind,
                    available: entry.available,
                })
                .collect(),
        })
        .collect();
    Json(groups)
}
