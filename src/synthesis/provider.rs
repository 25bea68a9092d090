//! Synthesis provider capability and the Google Cloud Text-to-Speech client.

use super::types::SynthesisRequest;
use super::SynthesisError;
use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Opaque external synthesis: markup in, audio bytes out.
#[async_trait]
pub trait SynthesisProvider: Send + Sync {
    async fn synthesize(&self, request: &SynthesisRequest<'_>) -> Result<Bytes, SynthesisError>;

    fn name(&self) -> &'static str;
}

/// Client for the Google Cloud Text-to-Speech REST API (`v1/text:synthesize`).
pub struct GoogleTtsProvider {
    http_client: reqwest::Client,
    base_url: String,
    endpoint_path: String,
    credentials: Credentials,
    project_id: Option<String>,
}

enum Credentials {
    ApiKey(String),
    AccessToken(String),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

impl GoogleTtsProvider {
    pub fn builder() -> GoogleTtsProviderBuilder {
        GoogleTtsProviderBuilder::new()
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }
}

#[async_trait]
impl SynthesisProvider for GoogleTtsProvider {
    async fn synthesize(&self, request: &SynthesisRequest<'_>) -> Result<Bytes, SynthesisError> {
        let endpoint = format!("{}{}", self.base_url.trim_end_matches('/'), self.endpoint_path);
        let mut voice = serde_json::json!({
            "languageCode": request.voice.language_code,
            "ssmlGender": request.voice.gender.as_str(),
        });
        if let Some(name) = &request.voice.name {
            voice["name"] = serde_json::Value::String(name.clone());
        }
        let body = serde_json::json!({
            "input": { "ssml": request.ssml },
            "voice": voice,
            "audioConfig": { "audioEncoding": request.encoding.as_str() },
        });

        let mut http = self.http_client.post(&endpoint).json(&body);
        http = match &self.credentials {
            Credentials::ApiKey(key) => http.query(&[("key", key)]),
            Credentials::AccessToken(token) => http.bearer_auth(token),
        };
        if let Some(project) = &self.project_id {
            http = http.header("x-goog-user-project", project);
        }

        debug!(provider = self.name(), bytes = request.ssml.len(), "requesting synthesis");
        let response = http
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

        let parsed: SynthesizeResponse = serde_json::from_slice(&bytes)
            .map_err(|e| SynthesisError::InvalidResponse(e.to_string()))?;
        let audio = base64::engine::general_purpose::STANDARD
            .decode(parsed.audio_content.as_bytes())
            .map_err(|e| SynthesisError::InvalidResponse(format!("audioContent: {}", e)))?;
        Ok(Bytes::from(audio))
    }

    fn name(&self) -> &'static str {
        "google-tts"
    }
}

pub struct GoogleTtsProviderBuilder {
    api_key: Option<String>,
    access_token: Option<String>,
    project_id: Option<String>,
    base_url: Option<String>,
    endpoint_path: Option<String>,
    timeout_secs: u64,
}

impl GoogleTtsProviderBuilder {
    pub fn new() -> Self {
        Self {
            api_key: None,
            access_token: None,
            project_id: None,
            base_url: None,
            endpoint_path: None,
            timeout_secs: 60,
        }
    }
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
    pub fn project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }
    pub fn endpoint_path(mut self, path: impl Into<String>) -> Self {
        self.endpoint_path = Some(path.into());
        self
    }
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn build(self) -> Result<GoogleTtsProvider, SynthesisError> {
        let credentials = match (self.access_token, self.api_key) {
            (Some(token), _) => Credentials::AccessToken(token),
            (None, Some(key)) => Credentials::ApiKey(key),
            (None, None) => std::env::var("GOOGLE_TTS_API_KEY")
                .ok()
                .map(Credentials::ApiKey)
                .ok_or_else(|| {
                    SynthesisError::Configuration(
                        "API key or access token required (set GOOGLE_TTS_API_KEY)".into(),
                    )
                })?,
        };
        let base_url = self
            .base_url
            .unwrap_or_else(|| "https://texttospeech.googleapis.com".to_string());
        let endpoint_path = self
            .endpoint_path
            .unwrap_or_else(|| "/v1/text:synthesize".to_string());
        let endpoint_path = if endpoint_path.starts_with('/') {
            endpoint_path
        } else {
            format!("/{}", endpoint_path)
        };
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| {
                SynthesisError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;
        Ok(GoogleTtsProvider {
            http_client,
            base_url,
            endpoint_path,
            credentials,
            project_id: self.project_id,
        })
    }
}

impl Default for GoogleTtsProviderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
