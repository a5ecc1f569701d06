//! Remote conversion providers.
//!
//! The dispatcher treats translation, speech-to-text and image-to-text as opaque
//! remote functions returning text. [`ConversionProvider`] is that boundary;
//! [`HttpConversionProvider`] talks to the deployed services over HTTP.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use sanketbani_config::ProvidersConfig;

/// One of the remote routines a provider exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Routine {
    Translate,
    SpeechToText,
    ImageToText,
}

impl Routine {
    pub const ALL: [Routine; 3] = [Routine::Translate, Routine::SpeechToText, Routine::ImageToText];

    pub fn as_str(&self) -> &'static str {
        match self {
            Routine::Translate => "translate",
            Routine::SpeechToText => "speech-to-text",
            Routine::ImageToText => "image-to-text",
        }
    }
}

impl fmt::Display for Routine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0} endpoint is not configured")]
    EndpointMissing(Routine),
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("{routine} request timed out after {seconds}s")]
    Timeout { routine: Routine, seconds: u64 },
    #[error("{routine} request failed: {source}")]
    Http {
        routine: Routine,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid {routine} response: {source}")]
    Response {
        routine: Routine,
        #[source]
        source: serde_json::Error,
    },
}

#[async_trait]
pub trait ConversionProvider: Send + Sync {
    async fn translate_text(&self, text: &str) -> Result<String, ProviderError>;

    async fn speech_to_text(&self, audio_url: &str) -> Result<String, ProviderError>;

    async fn image_to_text(&self, image_url: &str) -> Result<String, ProviderError>;
}

#[derive(Debug, Serialize)]
struct TextRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct UrlRequest<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct TextResponse {
    #[serde(alias = "Image to text success")]
    text: String,
}

/// HTTP client for the translation and recognition services.
///
/// Every routine is a JSON `POST` returning `{"text": ...}`; requests are bounded
/// by `request_timeout_seconds`.
#[derive(Debug, Clone)]
pub struct HttpConversionProvider {
    client: Client,
    translate_url: Option<String>,
    speech_to_text_url: Option<String>,
    image_to_text_url: Option<String>,
    api_key: Option<String>,
    timeout_seconds: u64,
}

impl HttpConversionProvider {
    pub fn new(config: &ProvidersConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(ProviderError::Client)?;

        Ok(Self {
            client,
            translate_url: config.translate_url.clone(),
            speech_to_text_url: config.speech_to_text_url.clone(),
            image_to_text_url: config.image_to_text_url.clone(),
            api_key: config.api_key.clone(),
            timeout_seconds: config.request_timeout_seconds,
        })
    }

    /// Routines with an endpoint configured.
    pub fn configured_routines(&self) -> Vec<Routine> {
        Routine::ALL
            .into_iter()
            .filter(|routine| self.endpoint(*routine).is_some())
            .collect()
    }

    fn endpoint(&self, routine: Routine) -> Option<&str> {
        match routine {
            Routine::Translate => self.translate_url.as_deref(),
            Routine::SpeechToText => self.speech_to_text_url.as_deref(),
            Routine::ImageToText => self.image_to_text_url.as_deref(),
        }
    }

    async fn call<B: Serialize + ?Sized>(
        &self,
        routine: Routine,
        body: &B,
    ) -> Result<String, ProviderError> {
        let url = self
            .endpoint(routine)
            .ok_or(ProviderError::EndpointMissing(routine))?;

        debug!(%routine, url, "calling conversion provider");

        let mut request = self.client.post(url).json(body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|source| self.classify(routine, source))?;

        let raw = response
            .text()
            .await
            .map_err(|source| self.classify(routine, source))?;

        let parsed: TextResponse = serde_json::from_str(&raw)
            .map_err(|source| ProviderError::Response { routine, source })?;

        Ok(parsed.text)
    }

    fn classify(&self, routine: Routine, source: reqwest::Error) -> ProviderError {
        if source.is_timeout() {
            warn!(%routine, seconds = self.timeout_seconds, "conversion provider timed out");
            ProviderError::Timeout {
                routine,
                seconds: self.timeout_seconds,
            }
        } else {
            ProviderError::Http { routine, source }
        }
    }
}

#[async_trait]
impl ConversionProvider for HttpConversionProvider {
    async fn translate_text(&self, text: &str) -> Result<String, ProviderError> {
        self.call(Routine::Translate, &TextRequest { text }).await
    }

    async fn speech_to_text(&self, audio_url: &str) -> Result<String, ProviderError> {
        self.call(Routine::SpeechToText, &UrlRequest { url: audio_url })
            .await
    }

    async fn image_to_text(&self, image_url: &str) -> Result<String, ProviderError> {
        self.call(Routine::ImageToText, &UrlRequest { url: image_url })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routine_names_are_kebab_case() {
        assert_eq!(Routine::SpeechToText.to_string(), "speech-to-text");
        assert_eq!(
            serde_json::to_string(&Routine::ImageToText).unwrap(),
            "\"image-to-text\""
        );
    }

    #[test]
    fn image_response_accepts_legacy_key() {
        let parsed: TextResponse =
            serde_json::from_str(r#"{"Image to text success": "cat\nsat"}"#).unwrap();
        assert_eq!(parsed.text, "cat\nsat");
    }

    #[test]
    fn configured_routines_skip_missing_endpoints() {
        let config = ProvidersConfig {
            translate_url: Some("http://localhost/translate".to_string()),
            ..ProvidersConfig::default()
        };
        let provider = HttpConversionProvider::new(&config).unwrap();
        assert_eq!(provider.configured_routines(), vec![Routine::Translate]);
    }
}
