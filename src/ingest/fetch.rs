use super::FetchError;
use crate::format::{ContentKind, FormatKey, RawSource};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Capability: retrieve the raw payload for a format.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, format: FormatKey) -> Result<RawSource, FetchError>;
}

/// Fetches sources from a `GET {base}/getFormat?format={key}` endpoint.
pub struct HttpSourceFetcher {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpSourceFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let endpoint = Url::parse(base_url)
            .and_then(|base| base.join("getFormat"))
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl SourceFetcher for HttpSourceFetcher {
    async fn fetch(&self, format: FormatKey) -> Result<RawSource, FetchError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("format", format.as_str());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let status = response.status();
        let kind = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(ContentKind::from_content_type);
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(format!("failed to read source body: {}", e)))?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let kind = kind.unwrap_or_else(|| {
            debug!(format = %format, "source has no recognised content type");
            format.content_kind()
        });
        Ok(RawSource::new(kind, body))
    }
}
