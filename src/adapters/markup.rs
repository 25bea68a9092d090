use super::{AdapterError, FormatAdapter};
use crate::format::{FormatKey, RawSource};
use crate::ssml::{SpeechDocument, SsmlBuilder};

const DEFAULT_HEADING_ID: &str = "heading";
const DEFAULT_CONTAINER_ID: &str = "paragraphsContainer";
const PARAGRAPH_TAG: &str = "p";

/// XHTML-style markup: the heading element becomes the first paragraph,
/// followed by one paragraph per `<p>` child of the container element.
///
/// The payload is parsed as XML, so HTML that is not well-formed (unclosed
/// `<br>`, named entities such as `&nbsp;`) is rejected.
#[derive(Debug, Clone)]
pub struct MarkupAdapter {
    heading_id: String,
    container_id: String,
}

impl Default for MarkupAdapter {
    fn default() -> Self {
        Self {
            heading_id: DEFAULT_HEADING_ID.to_string(),
            container_id: DEFAULT_CONTAINER_ID.to_string(),
        }
    }
}

impl MarkupAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_heading_id(mut self, id: impl Into<String>) -> Self {
        self.heading_id = id.into();
        self
    }

    pub fn with_container_id(mut self, id: impl Into<String>) -> Self {
        self.container_id = id.into();
        self
    }
}

impl FormatAdapter for MarkupAdapter {
    fn format(&self) -> FormatKey {
        FormatKey::Markup
    }

    fn adapt(&self, source: &RawSource) -> Result<SpeechDocument, AdapterError> {
        let doc = roxmltree::Document::parse(source.as_str())
            .map_err(|e| AdapterError::MalformedMarkup(e.to_string()))?;

        let heading = find_by_id(&doc, &self.heading_id)?;
        let container = find_by_id(&doc, &self.container_id)?;

        let mut builder = SsmlBuilder::new();
        builder.paragraph(text_content(heading))?;
        for child in container
            .children()
            .filter(|c| c.is_element() && c.tag_name().name() == PARAGRAPH_TAG)
        {
            builder.paragraph(text_content(child))?;
        }
        Ok(builder.build()?)
    }
}

fn find_by_id<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
    id: &str,
) -> Result<roxmltree::Node<'a, 'input>, AdapterError> {
    doc.descendants()
        .find(|n| n.is_element() && n.attribute("id") == Some(id))
        .ok_or_else(|| AdapterError::MalformedMarkup(format!("missing element with id=\"{}\"", id)))
}

/// Concatenated descendant text with whitespace runs collapsed to one space.
fn text_content(node: roxmltree::Node<'_, '_>) -> String {
    let raw: String = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html>
    <body>
      <div id="heading">
        <h1>Hi</h1>
      </div>
      <div id="paragraphsContainer">
        <p>Listen to any mp3 file by using this service.</p>
        <span>not a paragraph</span>
        <p>It can handle <b>many</b> different formats.</p>
      </div>
    </body>
    </html>"#;

    #[test]
    fn test_heading_then_container_paragraphs() {
        let doc = MarkupAdapter::new().adapt(&RawSource::markup(PAGE)).unwrap();
        assert_eq!(
            doc.paragraphs().collect::<Vec<_>>(),
            vec![
                "Hi",
                "Listen to any mp3 file by using this service.",
                "It can handle many different formats.",
            ]
        );
        assert_eq!(doc.sentences().count(), 0);
    }

    #[test]
    fn test_missing_heading_is_an_error() {
        let page = r#"<html><body><div id="paragraphsContainer"><p>x</p></div></body></html>"#;
        let err = MarkupAdapter::new().adapt(&RawSource::markup(page)).unwrap_err();
        assert!(matches!(err, AdapterError::MalformedMarkup(ref m) if m.contains("heading")));
    }

    #[test]
    fn test_missing_container_is_an_error() {
        let page = r#"<html><body><div id="heading">Hi</div></body></html>"#;
        assert!(matches!(
            MarkupAdapter::new().adapt(&RawSource::markup(page)),
            Err(AdapterError::MalformedMarkup(_))
        ));
    }

    #[test]
    fn test_not_well_formed_is_an_error() {
        assert!(matches!(
            MarkupAdapter::new().adapt(&RawSource::markup("<html><body><br></body></html>")),
            Err(AdapterError::MalformedMarkup(_))
        ));
    }

    #[test]
    fn test_custom_ids() {
        let page = r#"<article><h1 id="title">Title</h1><section id="body"><p>One</p></section></article>"#;
        let adapter = MarkupAdapter::new()
            .with_heading_id("title")
            .with_container_id("body");
        let doc = adapter.adapt(&RawSource::markup(page)).unwrap();
        assert_eq!(doc.paragraphs().collect::<Vec<_>>(), vec!["Title", "One"]);
    }
}
