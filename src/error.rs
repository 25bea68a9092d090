use crate::adapters::AdapterError;
use crate::ingest::{FetchError, IngestError};
use crate::ssml::MarkupError;
use crate::synthesis::SynthesisError;
use thiserror::Error;

/// Structured error context for configuration and boundary failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Config key or request field that caused the error (e.g., "server.port", "query.format")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "config_loader", "server")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the speech pipeline.
///
/// Every component reports its own typed error; this enum is what crosses
/// crate-level APIs so callers can still match on the category.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Speech markup error: {0}")]
    Markup(#[from] MarkupError),

    #[error("Format adapter error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("Ingestion error: {0}")]
    Ingest(#[from] IngestError),

    #[error("Source fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }

    /// True when the failure came from bad input rather than transport or provider trouble.
    pub fn is_parse_failure(&self) -> bool {
        match self {
            Error::Markup(_) | Error::Adapter(_) => true,
            Error::Ingest(e) => e.is_parse_failure(),
            _ => false,
        }
    }
}
