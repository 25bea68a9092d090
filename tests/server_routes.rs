//! HTTP routes served by an in-process server on an ephemeral port.

mod common;

use mockito::{Matcher, Server};
use speechcast::client::{Controller, HttpSpeechClient, Status};
use speechcast::format::{FormatKey, RawSource};
use speechcast::ingest::{HttpSourceFetcher, Ingestor, SourceCatalog};
use speechcast::playback::{PlaybackState, Player};
use speechcast::server::AppState;
use speechcast::synthesis::{FileStore, MemoryStore, SynthesisCache};
use std::sync::Arc;
use std::time::Duration;

fn memory_state(provider_server: &mockito::ServerGuard, catalog: SourceCatalog) -> AppState {
    let provider = Arc::new(common::provider_for(provider_server));
    AppState::new(catalog, SynthesisCache::new(provider, Arc::new(MemoryStore::new())))
}

#[tokio::test]
async fn test_get_format_serves_samples_with_content_types() {
    let provider = Server::new_async().await;
    let (base, shutdown) = common::spawn_server(memory_state(&provider, SourceCatalog::samples())).await;
    let http = reqwest::Client::new();

    for (query, content_type) in [
        ("text", "text/plain"),
        ("txt", "text/plain"),
        ("markup", "text/html"),
        ("html", "text/html"),
        ("json", "application/json"),
    ] {
        let response = http
            .get(format!("{}/getFormat", base))
            .query(&[("format", query)])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200, "format={}", query);
        let header = response.headers()["content-type"].to_str().unwrap().to_string();
        assert!(header.starts_with(content_type), "format={} got {}", query, header);
        assert!(!response.text().await.unwrap().is_empty());
    }
    shutdown.cancel();
}

#[tokio::test]
async fn test_get_format_rejects_bad_requests() {
    let provider = Server::new_async().await;
    let catalog = SourceCatalog::new().with_source(FormatKey::Text, RawSource::text("a\tb"));
    let (base, shutdown) = common::spawn_server(memory_state(&provider, catalog)).await;
    let http = reqwest::Client::new();

    let unknown = http
        .get(format!("{}/getFormat?format=pdf", base))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), 400);
    let body: serde_json::Value = unknown.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("pdf"));

    let missing = http.get(format!("{}/getFormat", base)).send().await.unwrap();
    assert_eq!(missing.status(), 400);

    let absent = http
        .get(format!("{}/getFormat?format=markup", base))
        .send()
        .await
        .unwrap();
    assert_eq!(absent.status(), 404);
    shutdown.cancel();
}

#[tokio::test]
async fn test_tts_synthesizes_once_and_caches_on_disk() {
    let mut provider = Server::new_async().await;
    let mock = common::mock_synthesis(&mut provider, b"ID3-structured", 1).await;
    let dir = tempfile::tempdir().unwrap();
    let cache = SynthesisCache::new(
        Arc::new(common::provider_for(&provider)),
        Arc::new(FileStore::new(dir.path(), "mp3")),
    );
    let (base, shutdown) =
        common::spawn_server(AppState::new(SourceCatalog::samples(), cache)).await;
    let http = reqwest::Client::new();
    let ssml = "<speak><s>From: @a</s><p>hi</p></speak>";

    for _ in 0..2 {
        let response = http
            .post(format!("{}/tts?format=structured", base))
            .header("content-type", "application/ssml+xml")
            .body(ssml)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["content-type"], "audio/mpeg");
        assert_eq!(&response.bytes().await.unwrap()[..], b"ID3-structured");
    }

    mock.assert_async().await;
    assert_eq!(
        std::fs::read(dir.path().join("structured.mp3")).unwrap(),
        b"ID3-structured"
    );
    shutdown.cancel();
}

#[tokio::test]
async fn test_tts_forwards_posted_markup_unchanged() {
    let mut provider = Server::new_async().await;
    let pretty = "<speak>\n  <s>A B</s>\n  <s>C</s>\n</speak>";
    let mock = provider
        .mock("POST", common::SYNTHESIZE_PATH)
        .match_query(Matcher::Any)
        .match_body(Matcher::PartialJson(serde_json::json!({
            "input": { "ssml": pretty }
        })))
        .with_status(200)
        .with_body(r#"{"audioContent":"SUQz"}"#)
        .create_async()
        .await;
    let (base, shutdown) =
        common::spawn_server(memory_state(&provider, SourceCatalog::samples())).await;

    let response = reqwest::Client::new()
        .post(format!("{}/tts?format=text", base))
        .header("content-type", "application/ssml+xml")
        .body(pretty)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(&response.bytes().await.unwrap()[..], b"ID3");
    mock.assert_async().await;
    shutdown.cancel();
}

#[tokio::test]
async fn test_tts_rejects_malformed_markup_without_calling_provider() {
    let mut provider = Server::new_async().await;
    let mock = common::mock_synthesis(&mut provider, b"never", 0).await;
    let (base, shutdown) =
        common::spawn_server(memory_state(&provider, SourceCatalog::samples())).await;
    let http = reqwest::Client::new();

    for (query, body) in [
        ("text", "<speak><p>unclosed</speak>"),
        ("text", "plain words"),
        ("audio", "<speak></speak>"),
    ] {
        let response = http
            .post(format!("{}/tts?format={}", base, query))
            .body(body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400, "{} {}", query, body);
    }

    mock.assert_async().await;
    shutdown.cancel();
}

#[tokio::test]
async fn test_tts_reports_provider_failure_as_bad_gateway() {
    let mut provider = Server::new_async().await;
    provider
        .mock("POST", common::SYNTHESIZE_PATH)
        .with_status(500)
        .with_body("backend exploded")
        .create_async()
        .await;
    let (base, shutdown) =
        common::spawn_server(memory_state(&provider, SourceCatalog::samples())).await;

    let response = reqwest::Client::new()
        .post(format!("{}/tts?format=text", base))
        .body("<speak><s>a</s></speak>")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 502);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("500"));
    shutdown.cancel();
}

#[tokio::test]
async fn test_controller_against_running_server() {
    let mut provider = Server::new_async().await;
    let mock = common::mock_synthesis(&mut provider, b"ID3-markup", 1).await;
    let (base, shutdown) =
        common::spawn_server(memory_state(&provider, SourceCatalog::samples())).await;

    let timeout = Duration::from_secs(5);
    let ingestor = Ingestor::new(Arc::new(HttpSourceFetcher::new(&base, timeout).unwrap()));
    let speech = HttpSpeechClient::new(&base, timeout).unwrap();
    let mut controller = Controller::new(
        Arc::new(ingestor),
        Arc::new(speech),
        Player::new(common::ScriptedDecoder::default()),
    );

    controller.select_format(FormatKey::Markup);
    assert_eq!(controller.settle().await, &Status::Ready);
    assert_eq!(controller.source_id(), Some("markup.mp3"));
    assert_eq!(controller.state(), PlaybackState::Loading);

    let loaded = controller.player().decoder().loaded.clone().unwrap();
    assert_eq!(&loaded.data[..], b"ID3-markup");
    assert_eq!(loaded.mime_type, "audio/mpeg");

    controller.player().decoder().sink().ready();
    controller.drain_decoder_events();
    controller.play();
    assert_eq!(controller.state(), PlaybackState::Playing);
    mock.assert_async().await;
    shutdown.cancel();
}
