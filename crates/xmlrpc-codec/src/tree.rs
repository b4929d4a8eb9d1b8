//! Parse trees and the pluggable grammar-validating parser.
//!
//! Decoding is split in two: a [`TreeParser`] turns raw bytes into an
//! [`Element`] tree that already satisfies the [`Grammar`], and the decoder
//! maps that tree into values. Any parser honouring the trait can be
//! substituted; [`XmlTreeParser`] is the default, built on `quick-xml`.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ParseError;
use crate::grammar::Grammar;
use crate::limits::MAX_ELEMENT_DEPTH;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// =============================================================================
// VALIDATED TREE
// =============================================================================

/// Content of a validated element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Character data with entities and CDATA resolved.
    Text(String),
    /// Child elements in document order. Insignificant whitespace is dropped.
    Elements(Vec<Element>),
}

/// A grammar-conforming element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub body: Body,
}

impl Element {
    /// Creates a text-only element.
    pub fn text(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            body: Body::Text(text.into()),
        }
    }

    /// Creates an element with child elements.
    pub fn with_children(tag: impl Into<String>, children: Vec<Element>) -> Self {
        Self {
            tag: tag.into(),
            body: Body::Elements(children),
        }
    }

    /// Returns the character data, or `None` for element content.
    pub fn text_content(&self) -> Option<&str> {
        match &self.body {
            Body::Text(text) => Some(text),
            Body::Elements(_) => None,
        }
    }

    /// Returns the child elements (empty for text content).
    pub fn children(&self) -> &[Element] {
        match &self.body {
            Body::Elements(children) => children,
            Body::Text(_) => &[],
        }
    }

    /// Returns the first child named `tag`.
    pub fn child(&self, tag: &str) -> Option<&Element> {
        self.children().iter().find(|c| c.tag == tag)
    }

    pub fn first_child(&self) -> Option<&Element> {
        self.children().first()
    }
}

// =============================================================================
// RAW TREE
// =============================================================================

/// A node of the unvalidated document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawNode {
    Element(RawElement),
    Text(String),
}

/// A well-formed but not yet validated element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawElement {
    pub name: String,
    pub nodes: Vec<RawNode>,
}

impl RawElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
        }
    }

    /// Appends character data, merging with a preceding text node.
    pub fn push_text(&mut self, text: &str) {
        if let Some(RawNode::Text(last)) = self.nodes.last_mut() {
            last.push_str(text);
        } else {
            self.nodes.push(RawNode::Text(text.to_owned()));
        }
    }

    pub fn push_element(&mut self, element: RawElement) {
        self.nodes.push(RawNode::Element(element));
    }
}

// =============================================================================
// PARSERS
// =============================================================================

/// A grammar-validating tree parser.
pub trait TreeParser {
    /// Parses `input` into a tree conforming to `grammar`.
    fn parse(&self, grammar: &Grammar, input: &[u8]) -> Result<Element, ParseError>;
}

/// XML tree parser backed by `quick-xml`.
///
/// Attributes and namespace prefixes are not interpreted. Comments,
/// processing instructions, the XML declaration and doctype are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlTreeParser;

impl XmlTreeParser {
    pub fn new() -> Self {
        Self
    }

    /// Reads a well-formed document into a raw tree without validating it.
    pub fn read_raw(&self, input: &[u8]) -> Result<RawElement, ParseError> {
        let input = input.strip_prefix(UTF8_BOM).unwrap_or(input);
        let mut reader = Reader::from_reader(input);
        let config = reader.config_mut();
        config.expand_empty_elements = true;
        config.check_end_names = true;

        let mut stack: Vec<RawElement> = Vec::new();
        let mut root: Option<RawElement> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| syntax_error(reader.buffer_position(), e))?;
            match event {
                Event::Start(start) => {
                    if stack.is_empty() && root.is_some() {
                        return Err(ParseError::new("document has more than one root element"));
                    }
                    if stack.len() >= MAX_ELEMENT_DEPTH {
                        return Err(ParseError::new(format!(
                            "element nesting exceeds maximum depth {}",
                            MAX_ELEMENT_DEPTH
                        )));
                    }
                    // Attributes carry no meaning here but must still be well formed.
                    for attr in start.attributes() {
                        attr.map_err(|e| syntax_error(reader.buffer_position(), e.into()))?;
                    }
                    let name = std::str::from_utf8(start.name().as_ref())
                        .map_err(|e| ParseError::new(format!("element name is not UTF-8: {e}")))?
                        .to_owned();
                    stack.push(RawElement::new(name));
                }
                Event::End(_) => {
                    // End tag names were matched by the reader.
                    let element = stack
                        .pop()
                        .ok_or_else(|| ParseError::new("unexpected closing tag"))?;
                    match stack.last_mut() {
                        Some(parent) => parent.push_element(element),
                        None => root = Some(element),
                    }
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| syntax_error(reader.buffer_position(), e))?;
                    append_text(&mut stack, &text)?;
                }
                Event::CData(cdata) => {
                    let text = String::from_utf8(cdata.into_inner().into_owned())
                        .map_err(|e| ParseError::new(format!("CDATA section is not UTF-8: {e}")))?;
                    append_text(&mut stack, &text)?;
                }
                Event::Eof => break,
                // comments, declaration, processing instructions, doctype
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(ParseError::new(format!(
                "unexpected end of document: <{}> is not closed",
                open.name
            )));
        }
        root.ok_or_else(|| ParseError::new("document has no root element"))
    }
}

impl TreeParser for XmlTreeParser {
    fn parse(&self, grammar: &Grammar, input: &[u8]) -> Result<Element, ParseError> {
        let raw = self.read_raw(input)?;
        grammar.validate(raw)
    }
}

fn syntax_error(position: impl std::fmt::Display, err: quick_xml::Error) -> ParseError {
    ParseError::new(format!("XML syntax error at byte {position}: {err}"))
}

fn append_text(stack: &mut [RawElement], text: &str) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(element) => {
            element.push_text(text);
            Ok(())
        }
        None if is_blank(text) => Ok(()),
        None => Err(ParseError::new("text outside the root element")),
    }
}

/// True if `text` is only XML whitespace.
pub(crate) fn is_blank(text: &str) -> bool {
    text.bytes()
        .all(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::grammar;

    fn raw(input: &str) -> Result<RawElement, ParseError> {
        XmlTreeParser.read_raw(input.as_bytes())
    }

    #[test]
    fn test_read_raw_basic() {
        let root = raw("<?xml version=\"1.0\"?>\n<a>x<b/>y</a>\n").unwrap();
        assert_eq!(root.name, "a");
        assert_eq!(
            root.nodes,
            vec![
                RawNode::Text("x".to_string()),
                RawNode::Element(RawElement::new("b")),
                RawNode::Text("y".to_string()),
            ]
        );
    }

    #[test]
    fn test_entities_and_cdata_merge() {
        let root = raw("<a>&lt;&amp;&#65;<!-- skip --><![CDATA[<raw>]]>&gt;</a>").unwrap();
        assert_eq!(root.nodes, vec![RawNode::Text("<&A<raw>>".to_string())]);
    }

    #[test]
    fn test_bom_is_skipped() {
        let mut input = UTF8_BOM.to_vec();
        input.extend_from_slice(b"<a/>");
        assert_eq!(XmlTreeParser.read_raw(&input).unwrap().name, "a");
    }

    #[test]
    fn test_attributes_ignored() {
        let root = raw("<a kind=\"x\"><b id='1'/></a>").unwrap();
        assert_eq!(root.nodes, vec![RawNode::Element(RawElement::new("b"))]);
    }

    #[test]
    fn test_mismatched_tags() {
        let err = raw("<a><b></a></b>").unwrap_err();
        assert!(err.message.starts_with("XML syntax error"), "{}", err);
    }

    #[test]
    fn test_attributes_must_be_well_formed() {
        for bad in ["<a x>y</a>", "<a x=1>y</a>", "<a x=\"1\" x=\"2\">y</a>"] {
            let err = raw(bad).unwrap_err();
            assert!(err.message.starts_with("XML syntax error"), "{}", err);
        }

        let doc = b"<methodResponse><params><param><value><string x>a</string></value></param></params></methodResponse>";
        assert!(XmlTreeParser.parse(grammar(), doc).is_err());
    }

    #[test]
    fn test_unclosed_document() {
        assert!(raw("<a><b></b>").is_err());
        assert!(raw("").is_err());
        assert!(raw("   ").is_err());
    }

    #[test]
    fn test_text_outside_root() {
        let err = raw("junk<a/>").unwrap_err();
        assert_eq!(err.message, "text outside the root element");
        assert!(raw("<a/>junk").is_err());
    }

    #[test]
    fn test_second_root() {
        let err = raw("<a/><b/>").unwrap_err();
        assert_eq!(err.message, "document has more than one root element");
    }

    #[test]
    fn test_nesting_limit() {
        let ok = format!("{}{}", "<a>".repeat(MAX_ELEMENT_DEPTH), "</a>".repeat(MAX_ELEMENT_DEPTH));
        assert!(raw(&ok).is_ok());

        let deep = format!(
            "{}{}",
            "<a>".repeat(MAX_ELEMENT_DEPTH + 1),
            "</a>".repeat(MAX_ELEMENT_DEPTH + 1)
        );
        let err = raw(&deep).unwrap_err();
        assert!(err.message.contains("maximum depth"));
    }

    #[test]
    fn test_element_accessors() {
        let element = Element::with_children(
            "member",
            vec![Element::text("name", "k"), Element::with_children("value", vec![])],
        );
        assert_eq!(element.child("name").and_then(Element::text_content), Some("k"));
        assert_eq!(element.first_child().map(|c| c.tag.as_str()), Some("name"));
        assert!(element.text_content().is_none());
        assert!(Element::text("name", "k").children().is_empty());
    }
}
