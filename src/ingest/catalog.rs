use super::{FetchError, SourceFetcher};
use crate::adapters::ChatMessage;
use crate::format::{FormatKey, RawSource};
use async_trait::async_trait;
use std::collections::HashMap;

const SAMPLE_TEXT: &str = "AMZN\t3232.58\tUSD\nFB\t272.14\tUSD\nAAPL\t142.06\tUSD\nNFLX\t523.28\tUSD";

const SAMPLE_MARKUP: &str = r#"<html>
    <body>
      <div id="heading">
        <h1>Hi</h1>
      </div>
      <div id="paragraphsContainer">
        <p>Listen to any mp3 file by using this service.</p>
        <p>It can handle many different formats.</p>
      </div>
    </body>
    </html>"#;

/// In-memory payloads keyed by format. Backs the `getFormat` endpoint and
/// doubles as an offline [`SourceFetcher`].
#[derive(Debug, Clone, Default)]
pub struct SourceCatalog {
    entries: HashMap<FormatKey, RawSource>,
}

impl SourceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in demo payloads. The chat message is stamped with the current time.
    pub fn samples() -> Self {
        let message = ChatMessage {
            from: "@somebody".into(),
            channel: "#actual-devs".into(),
            message: "Can you please check the latest PR? I just updated the API".into(),
            time_sent: chrono::Utc::now().timestamp_millis(),
        };
        let json = serde_json::to_string(&message).unwrap_or_default();
        Self::new()
            .with_source(FormatKey::Text, RawSource::text(SAMPLE_TEXT))
            .with_source(FormatKey::Markup, RawSource::markup(SAMPLE_MARKUP))
            .with_source(FormatKey::Structured, RawSource::structured(json))
    }

    pub fn with_source(mut self, format: FormatKey, source: RawSource) -> Self {
        self.entries.insert(format, source);
        self
    }

    pub fn get(&self, format: FormatKey) -> Option<&RawSource> {
        self.entries.get(&format)
    }
}

#[async_trait]
impl SourceFetcher for SourceCatalog {
    async fn fetch(&self, format: FormatKey) -> Result<RawSource, FetchError> {
        self.get(format).cloned().ok_or(FetchError::NotFound(format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::adapter_for;
    use crate::format::ContentKind;

    #[test]
    fn test_samples_cover_every_format_and_adapt() {
        let catalog = SourceCatalog::samples();
        for key in FormatKey::ALL {
            let source = catalog.get(key).expect("sample present");
            assert_eq!(source.kind, key.content_kind());
            adapter_for(key).adapt(source).expect("sample adapts");
        }
        assert_eq!(
            catalog.get(FormatKey::Structured).map(|s| s.kind),
            Some(ContentKind::StructuredData)
        );
    }

    #[tokio::test]
    async fn test_missing_entry_is_not_found() {
        let catalog = SourceCatalog::new().with_source(FormatKey::Text, RawSource::text("x"));
        assert!(catalog.fetch(FormatKey::Text).await.is_ok());
        assert_eq!(
            catalog.fetch(FormatKey::Markup).await,
            Err(FetchError::NotFound(FormatKey::Markup))
        );
    }
}
