//! Service dispatcher.
//!
//! Classifies a [`ConversionRequest`] against the [`ServiceCatalog`], then runs
//! exactly one pipeline. All validation happens before the first provider call.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::catalog::{Capability, InputKind, Pipeline, ResultKind, ServiceCatalog, ServiceName};
use crate::entities::{MessageContent, ParticipantId};
use crate::types::{ConversionError, DispatchResult, UpstreamError};
use sanketbani_providers::{ConversionProvider, ProviderError};

const MISSING_FIELDS: &str = "Please provide all required fields";

/// A caller's request to run one conversion service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRequest {
    #[serde(default, alias = "userId")]
    pub requester_id: Option<ParticipantId>,
    #[serde(default)]
    pub content: MessageContent,
    /// Raw service name; unknown names are rejected as unsupported.
    #[serde(default, alias = "selectedService")]
    pub requested_service: Option<String>,
}

impl ConversionRequest {
    pub fn new(
        requester_id: impl Into<ParticipantId>,
        content: MessageContent,
        requested_service: impl Into<String>,
    ) -> Self {
        Self {
            requester_id: Some(requester_id.into()),
            content,
            requested_service: Some(requested_service.into()),
        }
    }
}

/// Output of a dispatched service.
///
/// `payload == None` with a `result_kind` means the service is recognised but
/// not implemented yet; it is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub payload: Option<String>,
    pub result_kind: Option<ResultKind>,
}

impl ConversionResult {
    pub fn ready(payload: String, kind: ResultKind) -> Self {
        Self {
            payload: Some(payload),
            result_kind: Some(kind),
        }
    }

    pub fn unimplemented(kind: ResultKind) -> Self {
        Self {
            payload: None,
            result_kind: Some(kind),
        }
    }

    pub fn is_unimplemented(&self) -> bool {
        self.payload.is_none()
    }
}

/// A validated request, ready to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchPlan {
    pub service: ServiceName,
    pub input: InputKind,
    pub capability: Capability,
    /// Text for text services, media url otherwise
    pub argument: String,
}

pub struct Dispatcher {
    provider: Arc<dyn ConversionProvider>,
    catalog: ServiceCatalog,
    call_timeout: Duration,
}

impl Dispatcher {
    pub fn new(provider: Arc<dyn ConversionProvider>, call_timeout: Duration) -> Self {
        Self {
            provider,
            catalog: ServiceCatalog::new(),
            call_timeout,
        }
    }

    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    /// Validate `request` without calling any provider.
    ///
    /// Text is checked before media. When both are present the media plan takes
    /// precedence; since no service accepts both text and media, such a request
    /// always ends in an error here.
    pub fn plan(&self, request: &ConversionRequest) -> DispatchResult<DispatchPlan> {
        let requester_missing = request
            .requester_id
            .as_ref()
            .map_or(true, ParticipantId::is_empty);
        let service_name = request
            .requested_service
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());

        let service_name = match service_name {
            Some(name) if !requester_missing && !request.content.is_empty() => name,
            _ => return Err(ConversionError::missing_fields(MISSING_FIELDS)),
        };

        let service = service_name.parse::<ServiceName>().ok();
        let mut plan = None;

        if let Some(text) = request.content.text() {
            let (service, capability) = self.resolve(InputKind::Text, service)?;
            plan = Some(DispatchPlan {
                service,
                input: InputKind::Text,
                capability,
                argument: text.to_string(),
            });
        }

        if let Some(media) = request.content.media() {
            let input = InputKind::from_media(&media.kind)
                .ok_or_else(|| ConversionError::unsupported_media_type(media.kind.as_str()))?;
            let (service, capability) = self.resolve(input, service)?;
            plan = Some(DispatchPlan {
                service,
                input,
                capability,
                argument: media.url.clone(),
            });
        }

        plan.ok_or_else(|| ConversionError::missing_fields(MISSING_FIELDS))
    }

    fn resolve(
        &self,
        input: InputKind,
        service: Option<ServiceName>,
    ) -> DispatchResult<(ServiceName, Capability)> {
        service
            .map(|service| (service, self.catalog.lookup(input, service)))
            .filter(|(_, capability)| capability.is_supported())
            .ok_or_else(|| {
                ConversionError::unsupported_service(format!("Unsupported {input} service"))
            })
    }

    /// Validate and run `request`.
    pub async fn dispatch(&self, request: &ConversionRequest) -> DispatchResult<ConversionResult> {
        let plan = self.plan(request)?;
        debug!(service = %plan.service, input = %plan.input, "dispatching conversion");

        match plan.capability {
            Capability::Invoke(pipeline) => {
                let payload = self.run(plan.service, pipeline, &plan.argument).await?;
                info!(service = %plan.service, "conversion completed");
                Ok(ConversionResult::ready(payload, pipeline.result_kind()))
            }
            Capability::Unimplemented(kind) => {
                info!(service = %plan.service, "service is not available yet");
                Ok(ConversionResult::unimplemented(kind))
            }
            // plan() never yields an unsupported capability
            Capability::Unsupported => Err(ConversionError::unsupported_service(format!(
                "Unsupported {} service",
                plan.input
            ))),
        }
    }

    async fn run(
        &self,
        service: ServiceName,
        pipeline: Pipeline,
        argument: &str,
    ) -> DispatchResult<String> {
        let provider = &self.provider;
        match pipeline {
            Pipeline::Translate => self.call(service, provider.translate_text(argument)).await,
            Pipeline::TextToIsl => self.text_to_isl(service, argument).await,
            Pipeline::SpeechToText => self.call(service, provider.speech_to_text(argument)).await,
            Pipeline::ImageToIsl => {
                let extracted = self.call(service, provider.image_to_text(argument)).await?;
                let extracted = extracted.replace('\n', " ");
                debug!(%service, chars = extracted.len(), "text extracted from image");
                self.text_to_isl(service, &extracted).await
            }
        }
    }

    // Sign-language generation does not exist yet; translation stands in for it.
    async fn text_to_isl(&self, service: ServiceName, text: &str) -> DispatchResult<String> {
        self.call(service, self.provider.translate_text(text)).await
    }

    async fn call<F>(&self, service: ServiceName, routine: F) -> DispatchResult<String>
    where
        F: Future<Output = Result<String, ProviderError>>,
    {
        match tokio::time::timeout(self.call_timeout, routine).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(error)) => {
                warn!(%service, %error, "conversion provider failed");
                Err(ConversionError::upstream(service, error))
            }
            Err(_) => {
                let seconds = self.call_timeout.as_secs();
                warn!(%service, seconds, "conversion provider timed out");
                Err(ConversionError::upstream(
                    service,
                    UpstreamError::TimedOut { seconds },
                ))
            }
        }
    }
}
