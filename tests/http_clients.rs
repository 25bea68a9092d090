//! HTTP-facing clients against a mock server: the source fetcher, the Google
//! TTS provider and the speech client.

mod common;

use base64::Engine;
use mockito::{Matcher, Server};
use speechcast::client::{HttpSpeechClient, SpeechService};
use speechcast::format::{ContentKind, FormatKey};
use speechcast::ingest::{FetchError, HttpSourceFetcher, Ingestor, SourceFetcher};
use speechcast::synthesis::{
    AudioEncoding, GoogleTtsProvider, SynthesisError, SynthesisProvider, SynthesisRequest,
    VoiceGender, VoiceSpec,
};
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_fetcher_uses_response_content_type() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/getFormat")
        .match_query(Matcher::UrlEncoded("format".into(), "markup".into()))
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body("<html></html>")
        .create_async()
        .await;

    let fetcher = HttpSourceFetcher::new(&server.url(), TIMEOUT).unwrap();
    let source = fetcher.fetch(FormatKey::Markup).await.unwrap();

    assert_eq!(source.kind, ContentKind::Markup);
    assert_eq!(source.as_str(), "<html></html>");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetcher_reports_error_status() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/getFormat")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body("no such format")
        .create_async()
        .await;

    let fetcher = HttpSourceFetcher::new(&server.url(), TIMEOUT).unwrap();
    let err = fetcher.fetch(FormatKey::Text).await.unwrap_err();
    assert_eq!(
        err,
        FetchError::Status {
            status: 404,
            body: "no such format".into()
        }
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_ingest_over_http_separates_parse_from_fetch_failures() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/getFormat")
        .match_query(Matcher::UrlEncoded("format".into(), "structured".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"from":"@a"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/getFormat")
        .match_query(Matcher::UrlEncoded("format".into(), "text".into()))
        .with_status(503)
        .create_async()
        .await;

    let ingestor = Ingestor::new(Arc::new(HttpSourceFetcher::new(&server.url(), TIMEOUT).unwrap()));

    let parse = ingestor.ingest(FormatKey::Structured).await.unwrap_err();
    assert!(parse.is_parse_failure());
    assert!(parse.to_string().starts_with("bad input format"));

    let fetch = ingestor.ingest(FormatKey::Text).await.unwrap_err();
    assert!(!fetch.is_parse_failure());
}

#[tokio::test]
async fn test_google_provider_request_shape() {
    let mut server = Server::new_async().await;
    let audio = b"ID3\x04audio";
    let mock = server
        .mock("POST", common::SYNTHESIZE_PATH)
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .match_body(Matcher::PartialJson(serde_json::json!({
            "input": { "ssml": "<speak><s>hi</s></speak>" },
            "voice": { "languageCode": "en-GB", "ssmlGender": "MALE" },
            "audioConfig": { "audioEncoding": "OGG_OPUS" },
        })))
        .with_status(200)
        .with_body(
            serde_json::json!({
                "audioContent": base64::engine::general_purpose::STANDARD.encode(audio)
            })
            .to_string(),
        )
        .create_async()
        .await;

    let provider = common::provider_for(&server);
    let voice = VoiceSpec {
        language_code: "en-GB".into(),
        gender: VoiceGender::Male,
        name: None,
    };
    let request = SynthesisRequest {
        ssml: "<speak><s>hi</s></speak>",
        voice: &voice,
        encoding: AudioEncoding::OggOpus,
    };
    let bytes = provider.synthesize(&request).await.unwrap();

    assert_eq!(&bytes[..], audio);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_google_provider_access_token_and_project() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", common::SYNTHESIZE_PATH)
        .match_header("authorization", "Bearer tok-1")
        .match_header("x-goog-user-project", "demo-project")
        .with_status(200)
        .with_body(r#"{"audioContent":"SUQz"}"#)
        .create_async()
        .await;

    let provider = GoogleTtsProvider::builder()
        .base_url(server.url())
        .access_token("tok-1")
        .project_id("demo-project")
        .build()
        .unwrap();
    let voice = VoiceSpec::default();
    let bytes = provider
        .synthesize(&SynthesisRequest {
            ssml: "<speak></speak>",
            voice: &voice,
            encoding: AudioEncoding::Mp3,
        })
        .await
        .unwrap();

    assert_eq!(&bytes[..], b"ID3");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_google_provider_errors() {
    let mut server = Server::new_async().await;
    let provider = common::provider_for(&server);
    let voice = VoiceSpec::default();
    let request = SynthesisRequest {
        ssml: "<speak></speak>",
        voice: &voice,
        encoding: AudioEncoding::Mp3,
    };

    let denied = server
        .mock("POST", common::SYNTHESIZE_PATH)
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body("API key not valid")
        .create_async()
        .await;
    assert_eq!(
        provider.synthesize(&request).await.unwrap_err(),
        SynthesisError::ProviderStatus {
            status: 403,
            body: "API key not valid".into()
        }
    );
    denied.assert_async().await;

    let mut garbled = Server::new_async().await;
    let provider = common::provider_for(&garbled);
    let undecodable = garbled
        .mock("POST", common::SYNTHESIZE_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"audioContent":"***"}"#)
        .create_async()
        .await;
    assert!(matches!(
        provider.synthesize(&request).await,
        Err(SynthesisError::InvalidResponse(_))
    ));
    undecodable.assert_async().await;
}

#[tokio::test]
async fn test_speech_client_posts_markup() {
    let mut server = Server::new_async().await;
    let ssml = "<speak><s>From: @a</s></speak>";
    let mock = server
        .mock("POST", "/tts")
        .match_query(Matcher::UrlEncoded("format".into(), "structured".into()))
        .match_header("content-type", "application/ssml+xml")
        .match_body(ssml)
        .with_status(200)
        .with_header("content-type", "audio/mpeg")
        .with_body(b"ID3-bytes")
        .create_async()
        .await;

    let client = HttpSpeechClient::new(&server.url(), TIMEOUT).unwrap();
    let bytes = client.synthesize(FormatKey::Structured, ssml).await.unwrap();

    assert_eq!(&bytes[..], b"ID3-bytes");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_speech_client_maps_error_status() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/tts")
        .match_query(Matcher::UrlEncoded("format".into(), "text".into()))
        .with_status(502)
        .with_body(r#"{"error":"upstream"}"#)
        .create_async()
        .await;

    let client = HttpSpeechClient::new(&server.url(), TIMEOUT).unwrap();
    let ingested = speechcast::ingest::Ingestor::new(Arc::new(
        speechcast::ingest::SourceCatalog::samples(),
    ))
    .ingest_rendered(FormatKey::Text)
    .await
    .unwrap();

    match client.speak(&ingested).await.unwrap_err() {
        SynthesisError::ProviderStatus { status, body } => {
            assert_eq!(status, 502);
            assert!(body.contains("upstream"));
        }
        other => panic!("unexpected error: {other}"),
    }
    mock.assert_async().await;
}
