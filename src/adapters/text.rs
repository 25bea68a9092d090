use super::{AdapterError, FormatAdapter};
use crate::format::{FormatKey, RawSource};
use crate::ssml::{RenderOptions, SpeechDocument, SsmlBuilder};

/// Plain text: tabs become spaces, every line becomes a sentence.
///
/// Empty lines are kept as empty sentences. A trailing `\r` is stripped from
/// each line so CRLF input behaves like LF input.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextAdapter;

impl FormatAdapter for TextAdapter {
    fn format(&self) -> FormatKey {
        FormatKey::Text
    }

    fn adapt(&self, source: &RawSource) -> Result<SpeechDocument, AdapterError> {
        let normalized = source.as_str().replace('\t', " ");
        let mut builder = SsmlBuilder::new();
        for line in normalized.split('\n') {
            builder.add_sentence(line.strip_suffix('\r').unwrap_or(line));
        }
        Ok(builder.build()?)
    }

    fn render_options(&self) -> RenderOptions {
        RenderOptions::pretty()
    }
}
