use crate::format::FormatKey;
use crate::ingest::Ingested;
use crate::synthesis::{SynthesisCache, SynthesisError};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use url::Url;

/// Capability: turn an ingested document into audio bytes.
#[async_trait]
pub trait SpeechService: Send + Sync {
    async fn speak(&self, ingested: &Ingested) -> Result<Bytes, SynthesisError>;
}

/// Posts markup to a `POST {base}/tts?format={key}` endpoint.
pub struct HttpSpeechClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpSpeechClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SynthesisError> {
        let endpoint = Url::parse(base_url)
            .and_then(|base| base.join("tts"))
            .map_err(|e| SynthesisError::Configuration(format!("invalid server URL {}: {}", base_url, e)))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                SynthesisError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;
        Ok(Self { client, endpoint })
    }

    pub async fn synthesize(&self, format: FormatKey, ssml: &str) -> Result<Bytes, SynthesisError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("format", format.as_str());

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/ssml+xml")
            .body(ssml.to_string())
            .send()
            .await
            .map_err(|e| SynthesisError::Provider(format!("TTS request failed: {}", e)))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::Provider(format!("Failed to read TTS response: {}", e)))?;
        if !status.is_success() {
            return Err(SynthesisError::ProviderStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        Ok(bytes)
    }
}

#[async_trait]
impl SpeechService for HttpSpeechClient {
    async fn speak(&self, ingested: &Ingested) -> Result<Bytes, SynthesisError> {
        self.synthesize(ingested.format, &ingested.ssml).await
    }
}

/// In-process synthesis, bypassing the HTTP server.
#[async_trait]
impl SpeechService for SynthesisCache {
    async fn speak(&self, ingested: &Ingested) -> Result<Bytes, SynthesisError> {
        self.synthesize(ingested.format, &ingested.ssml).await
    }
}
