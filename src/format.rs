//! Input format keys and raw source payloads.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of supported input shapes.
///
/// A format key selects the adapter and, under the default cache keying,
/// also names the cached audio entry (`text.mp3`, `markup.mp3`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKey {
    #[serde(alias = "txt")]
    Text,
    #[serde(alias = "html")]
    Markup,
    #[serde(alias = "json")]
    Structured,
}

impl FormatKey {
    pub const ALL: [FormatKey; 3] = [FormatKey::Text, FormatKey::Markup, FormatKey::Structured];

    /// Canonical wire name used in query strings and cache file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Markup => "markup",
            Self::Structured => "structured",
        }
    }

    /// Content kind a well-behaved source endpoint declares for this format.
    pub fn content_kind(&self) -> ContentKind {
        match self {
            Self::Text => ContentKind::Text,
            Self::Markup => ContentKind::Markup,
            Self::Structured => ContentKind::StructuredData,
        }
    }
}

impl fmt::Display for FormatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown format '{0}' (expected one of: text, markup, structured)")]
pub struct UnknownFormat(pub String);

impl FromStr for FormatKey {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "markup" | "html" => Ok(Self::Markup),
            "structured" | "json" => Ok(Self::Structured),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// Declared kind of a raw payload, derived from its content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Text,
    Markup,
    StructuredData,
}

impl ContentKind {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Text => "text/plain",
            Self::Markup => "text/html",
            Self::StructuredData => "application/json",
        }
    }

    /// Map a `Content-Type` header value (parameters ignored) to a kind.
    pub fn from_content_type(value: &str) -> Option<Self> {
        let essence = value.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match essence.as_str() {
            "text/plain" => Some(Self::Text),
            "text/html" | "application/xhtml+xml" | "text/xml" | "application/xml" => {
                Some(Self::Markup)
            }
            "application/json" => Some(Self::StructuredData),
            _ => None,
        }
    }
}

/// A fetched payload and its declared kind. Consumed by an adapter, then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSource {
    pub kind: ContentKind,
    pub body: String,
}

impl RawSource {
    pub fn new(kind: ContentKind, body: impl Into<String>) -> Self {
        Self {
            kind,
            body: body.into(),
        }
    }

    pub fn text(body: impl Into<String>) -> Self {
        Self::new(ContentKind::Text, body)
    }

    pub fn markup(body: impl Into<String>) -> Self {
        Self::new(ContentKind::Markup, body)
    }

    pub fn structured(body: impl Into<String>) -> Self {
        Self::new(ContentKind::StructuredData, body)
    }

    pub fn as_str(&self) -> &str {
        &self.body
    }
}
