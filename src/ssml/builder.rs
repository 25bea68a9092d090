//! Append-only speech document builder.

use super::document::{push_text, Inline, Node, RenderOptions, SpeechDocument};
use super::MarkupError;

/// Builds a [`SpeechDocument`] from structural calls.
///
/// Sentences added while a paragraph is open become children of that
/// paragraph; otherwise they are appended at the top level. Paragraphs do not
/// nest.
///
/// Rendered text parses back to the same string, with one exception: control
/// characters XML 1.0 cannot carry (C0 controls other than tab, newline and
/// carriage return, plus U+FFFE and U+FFFF) are dropped on render.
#[derive(Debug, Clone, Default)]
pub struct SsmlBuilder {
    nodes: Vec<Node>,
    open_paragraph: Option<Vec<Inline>>,
}

impl SsmlBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sentence(&mut self, text: impl Into<String>) -> &mut Self {
        let text = text.into();
        match self.open_paragraph.as_mut() {
            Some(items) => items.push(Inline::Sentence(text)),
            None => self.nodes.push(Node::Sentence(text)),
        }
        self
    }

    pub fn enter_paragraph(&mut self) -> Result<&mut Self, MarkupError> {
        if self.open_paragraph.is_some() {
            return Err(MarkupError::StructuralImbalance(
                "cannot open a paragraph inside another paragraph".into(),
            ));
        }
        self.open_paragraph = Some(Vec::new());
        Ok(self)
    }

    pub fn add_paragraph_text(&mut self, text: impl AsRef<str>) -> Result<&mut Self, MarkupError> {
        let items = self.open_paragraph.as_mut().ok_or_else(|| {
            MarkupError::StructuralImbalance("paragraph text added with no open paragraph".into())
        })?;
        push_text(items, text.as_ref());
        Ok(self)
    }

    pub fn exit_paragraph(&mut self) -> Result<&mut Self, MarkupError> {
        let items = self.open_paragraph.take().ok_or_else(|| {
            MarkupError::StructuralImbalance("no open paragraph to close".into())
        })?;
        self.nodes.push(Node::Paragraph(items));
        Ok(self)
    }

    /// Close the innermost open node.
    pub fn up(&mut self) -> Result<&mut Self, MarkupError> {
        self.exit_paragraph()
    }

    /// Shorthand for enter, add text, exit.
    pub fn paragraph(&mut self, text: impl AsRef<str>) -> Result<&mut Self, MarkupError> {
        self.enter_paragraph()?.add_paragraph_text(text)?.exit_paragraph()
    }

    pub fn is_balanced(&self) -> bool {
        self.open_paragraph.is_none()
    }

    pub fn render(&self, options: RenderOptions) -> Result<String, MarkupError> {
        self.check_balanced()?;
        Ok(SpeechDocument::from_nodes(self.nodes.clone()).render(options))
    }

    pub fn build(self) -> Result<SpeechDocument, MarkupError> {
        self.check_balanced()?;
        Ok(SpeechDocument::from_nodes(self.nodes))
    }

    fn check_balanced(&self) -> Result<(), MarkupError> {
        if self.is_balanced() {
            Ok(())
        } else {
            Err(MarkupError::StructuralImbalance(
                "render called with an unclosed paragraph".into(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrepresentable_control_characters_are_dropped() {
        let mut builder = SsmlBuilder::new();
        builder.add_sentence("bell\u{7} tab\t cr\r\u{FFFF}end");
        let ssml = builder.render(RenderOptions::compact()).unwrap();
        assert_eq!(ssml, "<speak><s>bell tab\t cr&#13;end</s></speak>");

        let parsed = SpeechDocument::parse(&ssml).unwrap();
        assert_eq!(parsed.sentences().collect::<Vec<_>>(), vec!["bell tab\t cr\rend"]);
    }

    #[test]
    fn test_unclosed_paragraph_fails_render_and_build() {
        let mut builder = SsmlBuilder::new();
        builder.add_sentence("one");
        builder.enter_paragraph().unwrap().add_paragraph_text("two").unwrap();

        assert!(matches!(
            builder.render(RenderOptions::compact()),
            Err(MarkupError::StructuralImbalance(_))
        ));
        assert!(matches!(
            builder.clone().build(),
            Err(MarkupError::StructuralImbalance(_))
        ));

        builder.up().unwrap();
        assert_eq!(
            builder.render(RenderOptions::compact()).unwrap(),
            "<speak><s>one</s><p>two</p></speak>"
        );
    }

    #[test]
    fn test_structural_misuse_is_reported() {
        let mut builder = SsmlBuilder::new();
        assert!(builder.exit_paragraph().is_err());
        assert!(builder.add_paragraph_text("orphan").is_err());

        builder.enter_paragraph().unwrap();
        assert!(builder.enter_paragraph().is_err());
        assert!(builder.paragraph("nested").is_err());
    }

    #[test]
    fn test_sentences_inside_paragraph_keep_insertion_order() {
        let mut builder = SsmlBuilder::new();
        builder.enter_paragraph().unwrap();
        builder.add_paragraph_text("a").unwrap();
        builder.add_sentence("b");
        builder.add_paragraph_text("c").unwrap();
        builder.add_paragraph_text("d").unwrap();
        builder.exit_paragraph().unwrap();
        builder.add_sentence("e");

        let doc = builder.build().unwrap();
        assert_eq!(
            doc.nodes(),
            &[
                Node::Paragraph(vec![
                    Inline::Text("a".into()),
                    Inline::Sentence("b".into()),
                    Inline::Text("cd".into()),
                ]),
                Node::Sentence("e".into()),
            ]
        );
    }

    #[test]
    fn test_balanced_builds_always_render() {
        let mut builder = SsmlBuilder::new();
        for i in 0..5 {
            builder.add_sentence(format!("s{}", i));
            builder.paragraph(format!("p{}", i)).unwrap();
        }
        let rendered = builder.render(RenderOptions::pretty()).unwrap();
        let doc = SpeechDocument::parse(&rendered).unwrap();
        assert_eq!(doc, builder.build().unwrap());
    }
}
