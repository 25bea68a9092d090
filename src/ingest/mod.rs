//! Ingestion pipeline: fetch the raw source for a format, then adapt it.
//!
//! ```text
//! FormatKey → SourceFetcher → RawSource → FormatAdapter → SpeechDocument
//! ```
//!
//! Fetch failures and adapter failures stay distinct ([`IngestError::Fetch`]
//! vs [`IngestError::Parse`]) so callers can tell "network down" from "bad
//! input". There is exactly one attempt per call; cancellation drops the
//! in-flight request.

mod catalog;
mod fetch;

pub use catalog::SourceCatalog;
pub use fetch::{HttpSourceFetcher, SourceFetcher};

use crate::adapters::{adapter_for, AdapterError, FormatAdapter};
use crate::format::FormatKey;
use crate::ssml::SpeechDocument;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Raw source retrieval failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(String),

    #[error("source endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("no source available for format '{0}'")]
    NotFound(FormatKey),

    #[error("invalid source URL: {0}")]
    InvalidUrl(String),

    #[error("request cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    #[error("no document available: {0}")]
    Fetch(#[from] FetchError),

    #[error("bad input format: {0}")]
    Parse(#[from] AdapterError),
}

impl IngestError {
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, IngestError::Parse(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, IngestError::Fetch(FetchError::Cancelled))
    }
}

/// A speech document together with the markup it should be synthesized from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingested {
    pub format: FormatKey,
    pub document: SpeechDocument,
    pub ssml: String,
}

pub struct Ingestor {
    fetcher: Arc<dyn SourceFetcher>,
    adapters: HashMap<FormatKey, Box<dyn FormatAdapter>>,
}

impl Ingestor {
    pub fn new(fetcher: Arc<dyn SourceFetcher>) -> Self {
        let adapters = FormatKey::ALL
            .into_iter()
            .map(|key| (key, adapter_for(key)))
            .collect();
        Self { fetcher, adapters }
    }

    /// Replace the adapter registered for `adapter.format()`.
    pub fn with_adapter(mut self, adapter: Box<dyn FormatAdapter>) -> Self {
        self.adapters.insert(adapter.format(), adapter);
        self
    }

    pub async fn ingest(&self, format: FormatKey) -> Result<SpeechDocument, IngestError> {
        self.ingest_rendered(format).await.map(|i| i.document)
    }

    /// Like [`ingest`](Self::ingest), but aborts when `cancel` fires.
    pub async fn ingest_cancellable(
        &self,
        format: FormatKey,
        cancel: &CancellationToken,
    ) -> Result<Ingested, IngestError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(format = %format, "ingestion cancelled");
                Err(FetchError::Cancelled.into())
            }
            result = self.ingest_rendered(format) => result,
        }
    }

    /// Fetch, adapt and render with the format's preferred render options.
    pub async fn ingest_rendered(&self, format: FormatKey) -> Result<Ingested, IngestError> {
        let adapter = self
            .adapters
            .get(&format)
            .ok_or(FetchError::NotFound(format))?;

        debug!(format = %format, "fetching source");
        let source = self.fetcher.fetch(format).await.map_err(|e| {
            warn!(format = %format, error = %e, "source fetch failed");
            e
        })?;
        if source.kind != format.content_kind() {
            debug!(
                format = %format,
                declared = source.kind.mime_type(),
                "source content kind differs from format, adapting anyway"
            );
        }

        let document = adapter.adapt(&source).map_err(|e| {
            warn!(format = %format, error = %e, "source could not be adapted");
            e
        })?;
        let ssml = document.render(adapter.render_options());
        Ok(Ingested {
            format,
            document,
            ssml,
        })
    }
}
