//! Integration tests for the HTTP conversion provider.

use std::time::Duration;

use httpmock::prelude::*;
use sanketbani_config::ProvidersConfig;
use sanketbani_providers::{ConversionProvider, HttpConversionProvider, ProviderError, Routine};
use serde_json::json;

fn config_for(server: &MockServer) -> ProvidersConfig {
    ProvidersConfig {
        translate_url: Some(server.url("/translate")),
        speech_to_text_url: Some(server.url("/speech-to-text")),
        image_to_text_url: Some(server.url("/image-to-text")),
        api_key: None,
        request_timeout_seconds: 5,
    }
}

#[tokio::test]
async fn translate_posts_text_and_returns_translation() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/translate")
                .json_body(json!({ "text": "how are you" }));
            then.status(200).json_body(json!({ "text": "aap kaise hain" }));
        })
        .await;

    let provider = HttpConversionProvider::new(&config_for(&server)).expect("provider");
    let translated = provider
        .translate_text("how are you")
        .await
        .expect("translation succeeds");

    assert_eq!(translated, "aap kaise hain");
    mock.assert_async().await;
}

#[tokio::test]
async fn speech_to_text_sends_audio_url() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/speech-to-text")
                .json_body(json!({ "url": "https://cdn.test/a.mp3" }));
            then.status(200).json_body(json!({ "text": "take medicine" }));
        })
        .await;

    let provider = HttpConversionProvider::new(&config_for(&server)).expect("provider");
    let text = provider
        .speech_to_text("https://cdn.test/a.mp3")
        .await
        .expect("transcription succeeds");

    assert_eq!(text, "take medicine");
    mock.assert_async().await;
}

#[tokio::test]
async fn image_to_text_accepts_legacy_response_key() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/image-to-text");
            then.status(200)
                .json_body(json!({ "Image to text success": "cat\nsat" }));
        })
        .await;

    let provider = HttpConversionProvider::new(&config_for(&server)).expect("provider");
    let text = provider
        .image_to_text("https://cdn.test/cat.png")
        .await
        .expect("extraction succeeds");

    assert_eq!(text, "cat\nsat");
}

#[tokio::test]
async fn api_key_is_sent_as_bearer_token() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/translate")
                .header("authorization", "Bearer secret-key");
            then.status(200).json_body(json!({ "text": "ok" }));
        })
        .await;

    let mut config = config_for(&server);
    config.api_key = Some("secret-key".to_string());

    let provider = HttpConversionProvider::new(&config).expect("provider");
    provider.translate_text("hello").await.expect("call succeeds");
    mock.assert_async().await;
}

#[tokio::test]
async fn error_status_is_reported_as_http_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/translate");
            then.status(503).body("overloaded");
        })
        .await;

    let provider = HttpConversionProvider::new(&config_for(&server)).expect("provider");
    let err = provider.translate_text("hello").await.unwrap_err();

    assert!(matches!(
        err,
        ProviderError::Http {
            routine: Routine::Translate,
            ..
        }
    ));
}

#[tokio::test]
async fn malformed_body_is_reported_as_response_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/speech-to-text");
            then.status(200).json_body(json!({ "transcript": "nope" }));
        })
        .await;

    let provider = HttpConversionProvider::new(&config_for(&server)).expect("provider");
    let err = provider.speech_to_text("https://cdn.test/a.mp3").await.unwrap_err();

    assert!(matches!(
        err,
        ProviderError::Response {
            routine: Routine::SpeechToText,
            ..
        }
    ));
}

#[tokio::test]
async fn slow_provider_hits_the_request_timeout() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/translate");
            then.status(200)
                .delay(Duration::from_secs(3))
                .json_body(json!({ "text": "late" }));
        })
        .await;

    let mut config = config_for(&server);
    config.request_timeout_seconds = 1;

    let provider = HttpConversionProvider::new(&config).expect("provider");
    let err = provider.translate_text("hello").await.unwrap_err();

    assert!(matches!(
        err,
        ProviderError::Timeout {
            routine: Routine::Translate,
            seconds: 1
        }
    ));
}

#[tokio::test]
async fn missing_endpoint_fails_without_network() {
    let provider = HttpConversionProvider::new(&ProvidersConfig::default()).expect("provider");
    let err = provider.image_to_text("https://cdn.test/cat.png").await.unwrap_err();

    assert!(matches!(err, ProviderError::EndpointMissing(Routine::ImageToText)));
    assert_eq!(err.to_string(), "image-to-text endpoint is not configured");
}
