use axum::Json;
use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::rest::{health, services};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        services::run_service,
        services::list_services,
    ),
    components(
        schemas(
            health::HealthResponse,
            services::ServiceRequest,
            services::ServiceResponse,
            services::CatalogGroup,
            services::CatalogService,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Services", description = "Text, speech, image and ISL conversions"),
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
