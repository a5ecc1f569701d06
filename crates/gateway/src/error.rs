//! Error types for the gateway layer

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;
use utoipa::ToSchema;

use sanketbani_chats::ConversionError;

/// Gateway error types
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Body of every error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Conversion(error) if error.is_client_error() => StatusCode::BAD_REQUEST,
            GatewayError::Conversion(_) => StatusCode::BAD_GATEWAY,
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::Conversion(error) => error.code(),
            GatewayError::InvalidRequest(_) => "INVALID_REQUEST",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            warn!(error = %self, "request failed upstream");
        }

        let body = ErrorResponse {
            error: self.error_code().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        GatewayError::InvalidRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sanketbani_chats::{ServiceName, UpstreamError};

    #[test]
    fn client_errors_are_bad_requests() {
        let error = GatewayError::from(ConversionError::missing_fields("Please provide all required fields"));
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(error.to_string(), "Please provide all required fields");

        let error = GatewayError::from(ConversionError::unsupported_media_type("pdf"));
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn upstream_failures_are_bad_gateway() {
        let error = GatewayError::from(ConversionError::upstream(
            ServiceName::TextTranslate,
            UpstreamError::TimedOut { seconds: 30 },
        ));
        assert_eq!(error.status_code(), StatusCode::BAD_GATEWAY);
    }
}
