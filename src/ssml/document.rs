//! Speech document tree, serialization and parsing.

use super::MarkupError;
use std::fmt;

const ROOT: &str = "speak";
const SENTENCE: &str = "s";
const PARAGRAPH: &str = "p";
const INDENT: &str = "  ";

/// Top-level node of a speech document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Sentence(String),
    Paragraph(Vec<Inline>),
}

/// Content allowed inside a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Sentence(String),
}

impl Inline {
    pub fn text(&self) -> &str {
        match self {
            Inline::Text(t) | Inline::Sentence(t) => t,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Put each top-level node on its own indented line.
    pub pretty: bool,
}

impl RenderOptions {
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

/// A balanced speech markup document.
///
/// Only [`SsmlBuilder`](super::SsmlBuilder) and [`SpeechDocument::parse`]
/// create documents, so every instance is structurally complete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeechDocument {
    nodes: Vec<Node>,
}

impl SpeechDocument {
    pub(crate) fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-level sentences, in document order.
    pub fn sentences(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().filter_map(|n| match n {
            Node::Sentence(t) => Some(t.as_str()),
            Node::Paragraph(_) => None,
        })
    }

    /// Text of each paragraph with inline items concatenated.
    pub fn paragraphs(&self) -> impl Iterator<Item = String> + '_ {
        self.nodes.iter().filter_map(|n| match n {
            Node::Paragraph(items) => Some(items.iter().map(Inline::text).collect()),
            Node::Sentence(_) => None,
        })
    }

    /// Serialize to SSML. Output is a pure function of the tree and options.
    pub fn render(&self, options: RenderOptions) -> String {
        let mut out = String::new();
        out.push('<');
        out.push_str(ROOT);
        out.push('>');
        for node in &self.nodes {
            if options.pretty {
                out.push('\n');
                out.push_str(INDENT);
            }
            render_node(node, &mut out);
        }
        if options.pretty && !self.nodes.is_empty() {
            out.push('\n');
        }
        out.push_str("</");
        out.push_str(ROOT);
        out.push('>');
        out
    }

    pub fn to_ssml(&self) -> String {
        self.render(RenderOptions::compact())
    }

    /// Parse SSML produced by [`render`](Self::render) (compact or pretty).
    ///
    /// Accepts a `<speak>` root holding `<s>` and `<p>` children; paragraphs may
    /// hold text and `<s>` children. Whitespace between top-level elements is
    /// ignored, all other text is kept verbatim.
    pub fn parse(ssml: &str) -> Result<Self, MarkupError> {
        let doc = roxmltree::Document::parse(ssml).map_err(|e| MarkupError::Parse(e.to_string()))?;
        let root = doc.root_element();
        if root.tag_name().name() != ROOT {
            return Err(MarkupError::Parse(format!(
                "root element must be <{}>, found <{}>",
                ROOT,
                root.tag_name().name()
            )));
        }

        let mut nodes = Vec::new();
        for child in root.children() {
            if child.is_text() {
                if child.text().map_or(false, |t| !t.trim().is_empty()) {
                    return Err(MarkupError::Parse(
                        "bare text is not allowed directly under <speak>".into(),
                    ));
                }
                continue;
            }
            if !child.is_element() {
                continue;
            }
            match child.tag_name().name() {
                SENTENCE => nodes.push(Node::Sentence(leaf_text(child)?)),
                PARAGRAPH => {
                    let mut items = Vec::new();
                    for item in child.children() {
                        if item.is_text() {
                            push_text(&mut items, item.text().unwrap_or_default());
                        } else if item.is_element() {
                            if item.tag_name().name() != SENTENCE {
                                return Err(unexpected_element(item.tag_name().name(), PARAGRAPH));
                            }
                            items.push(Inline::Sentence(leaf_text(item)?));
                        }
                    }
                    nodes.push(Node::Paragraph(items));
                }
                other => return Err(unexpected_element(other, ROOT)),
            }
        }
        Ok(Self { nodes })
    }
}

impl fmt::Display for SpeechDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ssml())
    }
}

fn render_node(node: &Node, out: &mut String) {
    match node {
        Node::Sentence(text) => render_leaf(SENTENCE, text, out),
        Node::Paragraph(items) => {
            out.push_str("<p>");
            for item in items {
                match item {
                    Inline::Text(text) => out.push_str(&escape_text(text)),
                    Inline::Sentence(text) => render_leaf(SENTENCE, text, out),
                }
            }
            out.push_str("</p>");
        }
    }
}

fn render_leaf(tag: &str, text: &str, out: &mut String) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    out.push_str(&escape_text(text));
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

/// Append paragraph text, merging with a preceding text item. Empty text is dropped.
pub(crate) fn push_text(items: &mut Vec<Inline>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Inline::Text(last)) = items.last_mut() {
        last.push_str(text);
    } else {
        items.push(Inline::Text(text.to_string()));
    }
}

fn leaf_text(node: roxmltree::Node<'_, '_>) -> Result<String, MarkupError> {
    let mut text = String::new();
    for child in node.children() {
        if child.is_element() {
            return Err(unexpected_element(child.tag_name().name(), SENTENCE));
        }
        if let Some(t) = child.text().filter(|_| child.is_text()) {
            text.push_str(t);
        }
    }
    Ok(text)
}

fn unexpected_element(name: &str, parent: &str) -> MarkupError {
    MarkupError::Parse(format!("unexpected <{}> inside <{}>", name, parent))
}

/// Escape text for element content.
///
/// `\r` is written as a character reference because XML parsers fold raw
/// carriage returns into `\n`. Control characters XML 1.0 cannot carry are
/// dropped.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\r' => out.push_str("&#13;"),
            '\t' | '\n' => out.push(c),
            c if (c as u32) < 0x20 => {}
            '\u{FFFE}' | '\u{FFFF}' => {}
            c => out.push(c),
        }
    }
    out
}
