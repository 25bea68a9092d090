//! Shared fixtures for integration tests.
#![allow(dead_code)]

use base64::Engine;
use mockito::{Matcher, Mock, ServerGuard};
use speechcast::playback::{AudioSource, EventSink, MediaDecoder};
use speechcast::server::{serve, AppState};
use speechcast::synthesis::GoogleTtsProvider;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub const SYNTHESIZE_PATH: &str = "/v1/text:synthesize";

/// Mock a provider that answers `hits` synthesis calls with `audio`.
pub async fn mock_synthesis(server: &mut ServerGuard, audio: &[u8], hits: usize) -> Mock {
    let body = serde_json::json!({
        "audioContent": base64::engine::general_purpose::STANDARD.encode(audio),
    });
    server
        .mock("POST", SYNTHESIZE_PATH)
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .expect(hits)
        .create_async()
        .await
}

pub fn provider_for(server: &ServerGuard) -> GoogleTtsProvider {
    GoogleTtsProvider::builder()
        .base_url(server.url())
        .api_key("test-key")
        .build()
        .expect("provider builds")
}

/// Run the HTTP server on an ephemeral port; cancel the token to stop it.
pub async fn spawn_server(state: AppState) -> (String, CancellationToken) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let token = CancellationToken::new();
    let shutdown = token.clone();
    tokio::spawn(async move {
        let _ = serve(listener, state, async move { shutdown.cancelled().await }).await;
    });
    (format!("http://{}", addr), token)
}

/// Decoder double that records calls and lets the test emit signals.
#[derive(Default)]
pub struct ScriptedDecoder {
    pub calls: Vec<&'static str>,
    pub sink: Option<EventSink>,
    pub loaded: Option<AudioSource>,
    pub position: f64,
    pub duration: f64,
}

impl ScriptedDecoder {
    pub fn sink(&self) -> EventSink {
        self.sink.clone().expect("decoder loaded")
    }
}

impl MediaDecoder for ScriptedDecoder {
    fn load(&mut self, source: &AudioSource, events: EventSink) {
        self.calls.push("load");
        self.position = 0.0;
        self.loaded = Some(source.clone());
        self.sink = Some(events);
    }

    fn play(&mut self) {
        self.calls.push("play");
    }

    fn pause(&mut self) {
        self.calls.push("pause");
    }

    fn current_position(&self) -> f64 {
        self.position
    }

    fn duration(&self) -> f64 {
        self.duration
    }
}
