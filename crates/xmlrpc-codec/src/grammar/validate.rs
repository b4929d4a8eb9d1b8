//! Checking raw trees against the grammar productions.

use super::{ContentModel, ContentType, ElementDecl, Grammar, Occurs};
use crate::error::ParseError;
use crate::limits::MAX_ELEMENT_DEPTH;
use crate::tree::{is_blank, Element, RawElement, RawNode};

impl Grammar {
    /// Validates a raw document tree, producing the typed [`Element`] tree.
    ///
    /// Whitespace-only text between child elements is discarded and text
    /// content of leaf elements is concatenated.
    pub fn validate(&self, root: RawElement) -> Result<Element, ParseError> {
        let decl = match self.rule(ContentType::Document) {
            ContentModel::Choice(decls) => decls.iter().find(|d| d.tag == root.name),
            _ => None,
        };
        match decl {
            Some(decl) => self.validate_element(root, decl.content, 1),
            None => Err(ParseError::new(format!(
                "unexpected root element <{}>, expected {}",
                root.name,
                expected_tags(self.root_tags().iter().copied())
            ))),
        }
    }

    fn validate_element(
        &self,
        raw: RawElement,
        content: ContentType,
        depth: usize,
    ) -> Result<Element, ParseError> {
        if depth > MAX_ELEMENT_DEPTH {
            return Err(ParseError::new(format!(
                "element nesting exceeds maximum depth {}",
                MAX_ELEMENT_DEPTH
            )));
        }

        let RawElement { name, nodes } = raw;
        match self.rule(content) {
            ContentModel::Text => {
                let text = text_only(&name, nodes)?;
                Ok(Element::text(name, text))
            }
            ContentModel::Empty => {
                let text = text_only(&name, nodes)?;
                if !is_blank(&text) {
                    return Err(ParseError::new(format!("element <{name}> must be empty")));
                }
                Ok(Element::with_children(name, Vec::new()))
            }
            ContentModel::Sequence(decls) => {
                let children = element_children(&name, nodes)?;
                let children = self.validate_sequence(&name, decls, children, depth)?;
                Ok(Element::with_children(name, children))
            }
            ContentModel::Choice(decls) => {
                let children = element_children(&name, nodes)?;
                let child = self.validate_choice(&name, decls, children, depth)?;
                Ok(Element::with_children(name, vec![child]))
            }
            ContentModel::Mixed(decls) => {
                let has_elements = nodes.iter().any(|n| matches!(n, RawNode::Element(_)));
                if has_elements {
                    let children = element_children(&name, nodes)?;
                    let child = self.validate_choice(&name, decls, children, depth)?;
                    Ok(Element::with_children(name, vec![child]))
                } else {
                    let text = text_only(&name, nodes)?;
                    Ok(Element::text(name, text))
                }
            }
        }
    }

    fn validate_sequence(
        &self,
        parent: &str,
        decls: &[ElementDecl],
        children: Vec<RawElement>,
        depth: usize,
    ) -> Result<Vec<Element>, ParseError> {
        let mut out = Vec::with_capacity(children.len());
        let mut iter = children.into_iter().peekable();

        for decl in decls {
            match decl.occurs {
                Occurs::One => match iter.next() {
                    Some(child) if child.name == decl.tag => {
                        out.push(self.validate_element(child, decl.content, depth + 1)?);
                    }
                    Some(child) => {
                        return Err(ParseError::new(format!(
                            "expected <{}> in <{}>, found <{}>",
                            decl.tag, parent, child.name
                        )));
                    }
                    None => {
                        return Err(ParseError::new(format!(
                            "missing <{}> in <{}>",
                            decl.tag, parent
                        )));
                    }
                },
                Occurs::Optional => {
                    if let Some(child) = iter.next_if(|c| c.name == decl.tag) {
                        out.push(self.validate_element(child, decl.content, depth + 1)?);
                    }
                }
                Occurs::Many => {
                    while let Some(child) = iter.next_if(|c| c.name == decl.tag) {
                        out.push(self.validate_element(child, decl.content, depth + 1)?);
                    }
                }
            }
        }

        match iter.next() {
            Some(extra) => Err(ParseError::new(format!(
                "unexpected element <{}> in <{}>",
                extra.name, parent
            ))),
            None => Ok(out),
        }
    }

    fn validate_choice(
        &self,
        parent: &str,
        decls: &[ElementDecl],
        children: Vec<RawElement>,
        depth: usize,
    ) -> Result<Element, ParseError> {
        let mut iter = children.into_iter();
        match (iter.next(), iter.next()) {
            (Some(child), None) => match decls.iter().find(|d| d.tag == child.name) {
                Some(decl) => self.validate_element(child, decl.content, depth + 1),
                None => Err(ParseError::new(format!(
                    "unexpected element <{}> in <{}>, expected {}",
                    child.name,
                    parent,
                    expected_tags(decls.iter().map(|d| d.tag))
                ))),
            },
            (None, _) => Err(ParseError::new(format!(
                "<{}> must contain one of {}",
                parent,
                expected_tags(decls.iter().map(|d| d.tag))
            ))),
            (Some(_), Some(extra)) => Err(ParseError::new(format!(
                "unexpected element <{}> in <{}>",
                extra.name, parent
            ))),
        }
    }
}

/// Collects child elements, rejecting non-whitespace text.
fn element_children(parent: &str, nodes: Vec<RawNode>) -> Result<Vec<RawElement>, ParseError> {
    let mut children = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            RawNode::Element(element) => children.push(element),
            RawNode::Text(text) if is_blank(&text) => {}
            RawNode::Text(text) => {
                return Err(ParseError::new(format!(
                    "unexpected text {:?} in <{}>",
                    text.trim(),
                    parent
                )));
            }
        }
    }
    Ok(children)
}

/// Concatenates text nodes, rejecting child elements.
fn text_only(parent: &str, nodes: Vec<RawNode>) -> Result<String, ParseError> {
    let mut text = String::new();
    for node in nodes {
        match node {
            RawNode::Text(t) => text.push_str(&t),
            RawNode::Element(child) => {
                return Err(ParseError::new(format!(
                    "element <{}> must contain only text, found <{}>",
                    parent, child.name
                )));
            }
        }
    }
    Ok(text)
}

fn expected_tags<'a>(tags: impl Iterator<Item = &'a str>) -> String {
    tags.map(|t| format!("<{t}>")).collect::<Vec<_>>().join(" or ")
}

#[cfg(test)]
mod tests {
    use crate::grammar::grammar;
    use crate::tree::{Body, Element, XmlTreeParser};

    fn validate(input: &str) -> Result<Element, String> {
        let raw = XmlTreeParser.read_raw(input.as_bytes()).map_err(|e| e.message)?;
        grammar().validate(raw).map_err(|e| e.message)
    }

    #[test]
    fn test_method_call_shape() {
        let root = validate(
            "<methodCall>\n  <methodName>a.b</methodName>\n  <params>\n    <param><value><i4>1</i4></value></param>\n  </params>\n</methodCall>",
        )
        .unwrap();
        assert_eq!(root.tag, "methodCall");
        assert_eq!(root.children().len(), 2);
        let value = &root.children()[1].children()[0].children()[0];
        assert_eq!(value.tag, "value");
        assert_eq!(value.children()[0], Element::text("i4", "1"));
    }

    #[test]
    fn test_params_optional_in_call() {
        let root = validate("<methodCall><methodName>m</methodName></methodCall>").unwrap();
        assert_eq!(root.children().len(), 1);
        let root = validate("<methodCall><methodName>m</methodName><params/></methodCall>").unwrap();
        assert_eq!(root.children()[1].children().len(), 0);
    }

    #[test]
    fn test_value_is_mixed() {
        let bare = validate(
            "<methodResponse><params><param><value> abc </value></param></params></methodResponse>",
        )
        .unwrap();
        let value = &bare.children()[0].children()[0].children()[0];
        assert_eq!(value.body, Body::Text(" abc ".to_string()));

        let empty = validate(
            "<methodResponse><params><param><value></value></param></params></methodResponse>",
        )
        .unwrap();
        let value = &empty.children()[0].children()[0].children()[0];
        assert_eq!(value.body, Body::Text(String::new()));
    }

    #[test]
    fn test_value_rejects_text_and_element() {
        let err = validate(
            "<methodResponse><params><param><value>x<int>1</int></value></param></params></methodResponse>",
        )
        .unwrap_err();
        assert_eq!(err, "unexpected text \"x\" in <value>");
    }

    #[test]
    fn test_response_params_hold_exactly_one_param() {
        let err = validate(
            "<methodResponse><params><param><value/></param><param><value/></param></params></methodResponse>",
        )
        .unwrap_err();
        assert_eq!(err, "unexpected element <param> in <params>");

        let err = validate("<methodResponse><params></params></methodResponse>").unwrap_err();
        assert_eq!(err, "missing <param> in <params>");
    }

    #[test]
    fn test_response_is_params_or_fault() {
        let err = validate("<methodResponse></methodResponse>").unwrap_err();
        assert_eq!(err, "<methodResponse> must contain one of <params> or <fault>");

        let err = validate(
            "<methodResponse><params><param><value/></param></params><fault><value><struct/></value></fault></methodResponse>",
        )
        .unwrap_err();
        assert_eq!(err, "unexpected element <fault> in <methodResponse>");
    }

    #[test]
    fn test_fault_value_must_be_struct() {
        let err = validate("<methodResponse><fault><value><int>1</int></value></fault></methodResponse>")
            .unwrap_err();
        assert_eq!(err, "unexpected element <int> in <value>, expected <struct>");
    }

    #[test]
    fn test_unknown_value_type() {
        let err = validate(
            "<methodResponse><params><param><value><float>1</float></value></param></params></methodResponse>",
        )
        .unwrap_err();
        assert!(err.starts_with("unexpected element <float> in <value>"), "{}", err);
    }

    #[test]
    fn test_nil_must_be_empty() {
        let err = validate(
            "<methodResponse><params><param><value><nil>x</nil></value></param></params></methodResponse>",
        )
        .unwrap_err();
        assert_eq!(err, "element <nil> must be empty");
    }

    #[test]
    fn test_leaf_rejects_children() {
        let err = validate("<methodCall><methodName><b/></methodName></methodCall>").unwrap_err();
        assert_eq!(err, "element <methodName> must contain only text, found <b>");
    }

    #[test]
    fn test_member_order() {
        let err = validate(
            "<methodResponse><params><param><value><struct><member><value/><name>k</name></member></struct></value></param></params></methodResponse>",
        )
        .unwrap_err();
        assert_eq!(err, "expected <name> in <member>, found <value>");
    }

    #[test]
    fn test_unexpected_root() {
        let err = validate("<foo/>").unwrap_err();
        assert_eq!(
            err,
            "unexpected root element <foo>, expected <methodCall> or <methodResponse>"
        );
    }

    #[test]
    fn test_array_without_data() {
        let root = validate(
            "<methodResponse><params><param><value><array/></value></param></params></methodResponse>",
        )
        .unwrap();
        let array = &root.children()[0].children()[0].children()[0].children()[0];
        assert_eq!(array.tag, "array");
        assert!(array.children().is_empty());
    }
}
