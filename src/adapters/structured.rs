use super::{AdapterError, FormatAdapter};
use crate::format::{FormatKey, RawSource};
use crate::ssml::{SpeechDocument, SsmlBuilder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Chat message payload accepted by [`StructuredAdapter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub from: String,
    pub channel: String,
    pub message: String,
    /// Milliseconds since the Unix epoch.
    #[serde(rename = "timeSent")]
    pub time_sent: i64,
}

/// JSON chat message: "From", "On Channel" and "At" sentences, then the
/// message body as a paragraph.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredAdapter;

impl FormatAdapter for StructuredAdapter {
    fn format(&self) -> FormatKey {
        FormatKey::Structured
    }

    fn adapt(&self, source: &RawSource) -> Result<SpeechDocument, AdapterError> {
        let msg: ChatMessage = serde_json::from_str(source.as_str())
            .map_err(|e| AdapterError::MalformedData(e.to_string()))?;
        let at = render_timestamp(msg.time_sent).ok_or_else(|| {
            AdapterError::MalformedData(format!("timeSent out of range: {}", msg.time_sent))
        })?;

        let mut builder = SsmlBuilder::new();
        builder
            .add_sentence(format!("From: {}", msg.from))
            .add_sentence(format!("On Channel: {}", msg.channel))
            .add_sentence(format!("At: {}", at));
        builder.paragraph(&msg.message)?;
        Ok(builder.build()?)
    }
}

/// Human-readable UTC rendering of a millisecond timestamp,
/// e.g. `Thu Jan 01 1970 00:00:00 GMT+0000`.
pub fn render_timestamp(millis: i64) -> Option<String> {
    let at: DateTime<Utc> = DateTime::from_timestamp_millis(millis)?;
    Some(at.format("%a %b %d %Y %H:%M:%S GMT%z").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_sentences_and_paragraph() {
        let source = RawSource::structured(
            r##"{"from":"@a","channel":"#b","message":"hi","timeSent":0}"##,
        );
        let doc = StructuredAdapter.adapt(&source).unwrap();
        assert_eq!(
            doc.sentences().collect::<Vec<_>>(),
            vec![
                "From: @a",
                "On Channel: #b",
                "At: Thu Jan 01 1970 00:00:00 GMT+0000",
            ]
        );
        assert_eq!(doc.paragraphs().collect::<Vec<_>>(), vec!["hi"]);
    }

    #[test]
    fn test_render_timestamp() {
        assert_eq!(
            render_timestamp(1_625_097_600_000).as_deref(),
            Some("Thu Jul 01 2021 00:00:00 GMT+0000")
        );
        assert!(render_timestamp(i64::MAX).is_none());
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let source = RawSource::structured(r##"{"from":"@a","channel":"#b","timeSent":0}"##);
        let err = StructuredAdapter.adapt(&source).unwrap_err();
        assert!(matches!(err, AdapterError::MalformedData(ref m) if m.contains("message")));
    }

    #[test]
    fn test_unparsable_timestamp_is_malformed() {
        for body in [
            r##"{"from":"@a","channel":"#b","message":"hi","timeSent":"yesterday"}"##,
            r##"{"from":"@a","channel":"#b","message":"hi","timeSent":9223372036854775807}"##,
            "not json",
        ] {
            assert!(
                matches!(
                    StructuredAdapter.adapt(&RawSource::structured(body)),
                    Err(AdapterError::MalformedData(_))
                ),
                "{} should be rejected",
                body
            );
        }
    }

    #[test]
    fn test_reserved_characters_survive_rendering() {
        let source = RawSource::structured(
            r##"{"from":"<bot>","channel":"#r&d","message":"a < b","timeSent":0}"##,
        );
        let doc = StructuredAdapter.adapt(&source).unwrap();
        let parsed = SpeechDocument::parse(&doc.to_ssml()).unwrap();
        assert_eq!(parsed, doc);
        assert_eq!(parsed.sentences().next(), Some("From: <bot>"));
    }
}
