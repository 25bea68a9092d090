//! Format adapters: raw source payloads in, speech documents out.
//!
//! Each adapter is a pure transformation driven through [`SsmlBuilder`]
//! (`crate::ssml::SsmlBuilder`). Adapters never perform I/O; fetching the
//! payload is the job of [`crate::ingest`].
//!
//! | Format | Adapter | Output |
//! |--------|---------|--------|
//! | [`FormatKey::Text`] | [`TextAdapter`] | one sentence per line |
//! | [`FormatKey::Markup`] | [`MarkupAdapter`] | heading paragraph + one paragraph per container child |
//! | [`FormatKey::Structured`] | [`StructuredAdapter`] | three header sentences + message paragraph |

mod markup;
mod structured;
mod text;

pub use markup::MarkupAdapter;
pub use structured::{render_timestamp, ChatMessage, StructuredAdapter};
pub use text::TextAdapter;

use crate::format::{FormatKey, RawSource};
use crate::ssml::{MarkupError, RenderOptions, SpeechDocument};

/// Why an adapter could not produce a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    #[error("malformed markup source: {0}")]
    MalformedMarkup(String),

    #[error("malformed structured data: {0}")]
    MalformedData(String),

    #[error(transparent)]
    Structure(#[from] MarkupError),
}

/// Capability: produce a speech document from a raw source.
pub trait FormatAdapter: Send + Sync {
    fn format(&self) -> FormatKey;

    fn adapt(&self, source: &RawSource) -> Result<SpeechDocument, AdapterError>;

    /// Serialization style this format is sent to synthesis with.
    fn render_options(&self) -> RenderOptions {
        RenderOptions::compact()
    }
}

/// Default adapter for a format key.
pub fn adapter_for(format: FormatKey) -> Box<dyn FormatAdapter> {
    match format {
        FormatKey::Text => Box::new(TextAdapter),
        FormatKey::Markup => Box::new(MarkupAdapter::default()),
        FormatKey::Structured => Box::new(StructuredAdapter),
    }
}
