//! Runtime configuration: YAML file plus environment overrides.
//!
//! Every field has a default, so an empty file (or no file) yields a working
//! local setup: server on port 8080, cache in the working directory, voice
//! `en-US`/`FEMALE`, MP3 output.
//!
//! Environment variables applied after the file is read:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `SPEECHCAST_PORT` | `server.port` |
//! | `SPEECHCAST_CACHE_DIR` | `server.cache_dir` |
//! | `SPEECHCAST_SERVER_URL` | `client.server_url` |
//! | `GOOGLE_TTS_API_KEY` | `provider.api_key` |
//! | `GOOGLE_CLOUD_PROJECT` | `provider.project_id` |
//! | `SPEECHCAST_HTTP_TIMEOUT_SECS` | `provider.timeout_secs`, `client.timeout_secs` |

use crate::client::HttpSpeechClient;
use crate::ingest::HttpSourceFetcher;
use crate::synthesis::{
    AudioEncoding, CacheKeying, FileStore, GoogleTtsProvider, SynthesisCache, SynthesisProvider,
    VoiceSpec,
};
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub voice: VoiceSpec,
    pub encoding: AudioEncoding,
    pub cache: CacheOptions,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding `{format}.{ext}` audio files.
    pub cache_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cache_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Override for the provider REST root (tests, proxies).
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub project_id: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            project_id: None,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheOptions {
    pub keying: CacheKeying,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: String,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8080".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Read `path` (when given), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    Error::configuration_with_context(
                        format!("failed to read config file: {}", e),
                        ErrorContext::new()
                            .with_details(path.display().to_string())
                            .with_source("config_loader"),
                    )
                })?;
                Self::from_yaml_str(&content)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        debug!(
            port = config.server.port,
            cache_dir = %config.server.cache_dir.display(),
            encoding = config.encoding.as_str(),
            "configuration loaded"
        );
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid config: {}", e),
                ErrorContext::new().with_source("config_loader"),
            )
        })
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(port) = lookup("SPEECHCAST_PORT") {
            self.server.port = parse_number(&port, "SPEECHCAST_PORT")?;
        }
        if let Some(dir) = lookup("SPEECHCAST_CACHE_DIR") {
            self.server.cache_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup("SPEECHCAST_SERVER_URL") {
            self.client.server_url = url;
        }
        if let Some(key) = lookup("GOOGLE_TTS_API_KEY").filter(|k| !k.is_empty()) {
            self.provider.api_key = Some(key);
        }
        if let Some(project) = lookup("GOOGLE_CLOUD_PROJECT").filter(|p| !p.is_empty()) {
            self.provider.project_id = Some(project);
        }
        if let Some(secs) = lookup("SPEECHCAST_HTTP_TIMEOUT_SECS") {
            let secs = parse_number(&secs, "SPEECHCAST_HTTP_TIMEOUT_SECS")?;
            self.provider.timeout_secs = secs;
            self.client.timeout_secs = secs;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.provider.timeout_secs == 0 {
            return Err(invalid("provider.timeout_secs", "must be positive"));
        }
        if self.client.timeout_secs == 0 {
            return Err(invalid("client.timeout_secs", "must be positive"));
        }
        url::Url::parse(&self.client.server_url)
            .map_err(|e| invalid("client.server_url", e.to_string()))?;
        if let Some(base) = &self.provider.base_url {
            url::Url::parse(base).map_err(|e| invalid("provider.base_url", e.to_string()))?;
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn build_provider(&self) -> Result<GoogleTtsProvider> {
        let mut builder = GoogleTtsProvider::builder()
            .timeout(Duration::from_secs(self.provider.timeout_secs));
        if let Some(base) = &self.provider.base_url {
            builder = builder.base_url(base);
        }
        if let Some(key) = &self.provider.api_key {
            builder = builder.api_key(key);
        }
        if let Some(project) = &self.provider.project_id {
            builder = builder.project_id(project);
        }
        Ok(builder.build()?)
    }

    /// File-backed cache in `server.cache_dir` in front of `provider`.
    pub fn build_cache(&self, provider: Arc<dyn SynthesisProvider>) -> SynthesisCache {
        let store = FileStore::new(self.server.cache_dir.clone(), self.encoding.extension());
        SynthesisCache::new(provider, Arc::new(store))
            .with_voice(self.voice.clone())
            .with_encoding(self.encoding)
            .with_keying(self.cache.keying)
    }

    pub fn build_source_fetcher(&self) -> Result<HttpSourceFetcher> {
        Ok(HttpSourceFetcher::new(
            &self.client.server_url,
            Duration::from_secs(self.client.timeout_secs),
        )?)
    }

    pub fn build_speech_client(&self) -> Result<HttpSpeechClient> {
        Ok(HttpSpeechClient::new(
            &self.client.server_url,
            Duration::from_secs(self.client.timeout_secs),
        )?)
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, var: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        Error::configuration_with_context(
            format!("invalid number '{}'", value),
            ErrorContext::new()
                .with_field_path(var)
                .with_source("environment"),
        )
    })
}

fn invalid(field: &str, details: impl Into<String>) -> Error {
    Error::configuration_with_context(
        "invalid configuration value",
        ErrorContext::new()
            .with_field_path(field)
            .with_details(details),
    )
}
