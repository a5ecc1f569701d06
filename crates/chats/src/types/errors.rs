//! Error types for the chat core.

use thiserror::Error;

use crate::services::catalog::ServiceName;
use sanketbani_providers::ProviderError;

/// Result type alias for message construction
pub type ChatResult<T> = Result<T, ChatError>;

/// Result type alias for dispatcher calls
pub type DispatchResult<T> = Result<T, ConversionError>;

/// Errors raised while building chat values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("Message must carry text or a media url")]
    EmptyContent,
}

/// Failures reported by the service dispatcher.
///
/// The display text of the first three variants is the message surfaced to clients.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("{message}")]
    MissingFields { message: String },

    #[error("{message}")]
    UnsupportedService { message: String },

    #[error("Unsupported media type: {kind}")]
    UnsupportedMediaType { kind: String },

    #[error("{service} failed: {source}")]
    UpstreamFailure {
        service: ServiceName,
        #[source]
        source: UpstreamError,
    },
}

/// Cause of an [`ConversionError::UpstreamFailure`].
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("no response within {seconds}s")]
    TimedOut { seconds: u64 },
}

impl ConversionError {
    pub fn missing_fields(message: impl Into<String>) -> Self {
        Self::MissingFields {
            message: message.into(),
        }
    }

    pub fn unsupported_service(message: impl Into<String>) -> Self {
        Self::UnsupportedService {
            message: message.into(),
        }
    }

    pub fn unsupported_media_type(kind: impl Into<String>) -> Self {
        Self::UnsupportedMediaType { kind: kind.into() }
    }

    pub fn upstream(service: ServiceName, source: impl Into<UpstreamError>) -> Self {
        Self::UpstreamFailure {
            service,
            source: source.into(),
        }
    }

    /// Stable machine-readable code for the error class
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingFields { .. } => "MISSING_FIELDS",
            Self::UnsupportedService { .. } => "UNSUPPORTED_SERVICE",
            Self::UnsupportedMediaType { .. } => "UNSUPPORTED_MEDIA_TYPE",
            Self::UpstreamFailure { .. } => "UPSTREAM_FAILURE",
        }
    }

    /// Whether the caller supplied an invalid request
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::UpstreamFailure { .. })
    }
}
