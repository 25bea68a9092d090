//! Speech markup (SSML) construction, rendering and parsing.
//!
//! # Speech Markup Module
//!
//! Every input format is funnelled into one representation: a
//! [`SpeechDocument`], an ordered list of sentences and paragraphs wrapped
//! in a `<speak>` root. Documents are assembled with [`SsmlBuilder`], which
//! tracks open structure and refuses to render while a paragraph is still
//! open.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`SsmlBuilder`] | Append-only builder with explicit enter/exit calls |
//! | [`SpeechDocument`] | Immutable, balanced document tree |
//! | [`RenderOptions`] | Compact or indented serialization |
//! | [`MarkupError`] | Imbalanced structure or unparsable markup |
//!
//! ## Example
//!
//! ```rust
//! use speechcast::ssml::{RenderOptions, SsmlBuilder};
//!
//! let mut builder = SsmlBuilder::new();
//! builder.add_sentence("From: @a");
//! builder.enter_paragraph()?.add_paragraph_text("hi")?.exit_paragraph()?;
//! let ssml = builder.render(RenderOptions::compact())?;
//! assert_eq!(ssml, "<speak><s>From: @a</s><p>hi</p></speak>");
//! # Ok::<(), speechcast::ssml::MarkupError>(())
//! ```
//!
//! Text is escaped on the way out and unescaped by [`SpeechDocument::parse`],
//! so sentence and paragraph text survives a render/parse cycle unchanged.
//! Control characters XML cannot represent are the exception; they are
//! dropped on render.

mod builder;
mod document;

pub use builder::SsmlBuilder;
pub use document::{escape_text, Inline, Node, RenderOptions, SpeechDocument};

/// Errors raised while building, rendering or parsing speech markup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
    #[error("structural imbalance: {0}")]
    StructuralImbalance(String),

    #[error("invalid speech markup: {0}")]
    Parse(String),
}
