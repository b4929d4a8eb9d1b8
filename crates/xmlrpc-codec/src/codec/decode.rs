//! Decoding of validated parse trees into envelopes and values.

use tracing::debug;

use crate::codec::primitives::{parse_boolean, parse_double, parse_int};
use crate::error::DecodeError;
use crate::grammar::{grammar, tags};
use crate::limits::{MAX_DOCUMENT_SIZE, MAX_NESTING_DEPTH};
use crate::model::{BinaryRaw, DateTimeRaw, Envelope, Fault, MethodCall, MethodResponse, Struct, Value};
use crate::tree::{Body, Element, TreeParser, XmlTreeParser};

/// Options for decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Reject `<nil/>` instead of decoding it to [`Value::Nil`].
    pub exclude_nil: bool,
}

impl DecodeOptions {
    /// Creates default decoding options (nil accepted).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude_nil(mut self, exclude_nil: bool) -> Self {
        self.exclude_nil = exclude_nil;
        self
    }
}

/// Decodes a wire document with the default XML parser.
pub fn decode(input: &[u8], options: &DecodeOptions) -> Result<Envelope, DecodeError> {
    decode_with(&XmlTreeParser, input, options)
}

/// Decodes a wire document with a caller-supplied tree parser.
pub fn decode_with<P: TreeParser + ?Sized>(
    parser: &P,
    input: &[u8],
    options: &DecodeOptions,
) -> Result<Envelope, DecodeError> {
    debug!(len = input.len(), exclude_nil = options.exclude_nil, "decoding xml-rpc document");

    let result = decode_document(parser, input, options);
    match &result {
        Ok(envelope) => debug!(kind = envelope.kind().as_str(), "decoded xml-rpc document"),
        Err(err) => debug!(error = %err, "failed to decode xml-rpc document"),
    }
    result
}

/// Decodes a wire document, panicking with the diagnostic on failure.
pub fn decode_or_panic(input: &[u8], options: &DecodeOptions) -> Envelope {
    decode(input, options).unwrap_or_else(|err| panic!("{}", err))
}

/// Decodes a single validated `value` element.
pub fn decode_value_element(element: &Element, options: &DecodeOptions) -> Result<Value, DecodeError> {
    Decoder { options }.value(element, 0)
}

fn decode_document<P: TreeParser + ?Sized>(
    parser: &P,
    input: &[u8],
    options: &DecodeOptions,
) -> Result<Envelope, DecodeError> {
    if input.len() > MAX_DOCUMENT_SIZE {
        return Err(DecodeError::InputTooLarge {
            len: input.len(),
            max: MAX_DOCUMENT_SIZE,
        });
    }

    let root = parser.parse(grammar(), input)?;
    Decoder { options }.envelope(&root)
}

/// Walks a validated tree.
///
/// The grammar already guarantees the shapes matched here; shape checks only
/// fail for trees produced by parsers that skip validation.
struct Decoder<'o> {
    options: &'o DecodeOptions,
}

impl Decoder<'_> {
    fn envelope(&self, root: &Element) -> Result<Envelope, DecodeError> {
        match root.tag.as_str() {
            tags::METHOD_CALL => self.method_call(root).map(Envelope::Call),
            tags::METHOD_RESPONSE => self.method_response(root),
            other => Err(DecodeError::shape(format!("unexpected root element <{other}>"))),
        }
    }

    fn method_call(&self, root: &Element) -> Result<MethodCall, DecodeError> {
        let method_name = child(root, tags::METHOD_NAME)?;
        let method_name = leaf_text(method_name)?.to_string();

        // An absent <params> and an empty one both mean no parameters.
        let params = match root.child(tags::PARAMS) {
            Some(params) => params
                .children()
                .iter()
                .map(|param| self.param(param))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        Ok(MethodCall { method_name, params })
    }

    fn param(&self, param: &Element) -> Result<Value, DecodeError> {
        self.value(child(param, tags::VALUE)?, 0)
    }

    fn method_response(&self, root: &Element) -> Result<Envelope, DecodeError> {
        let branch = root
            .first_child()
            .ok_or_else(|| DecodeError::shape("empty <methodResponse>"))?;

        match branch.tag.as_str() {
            tags::PARAMS => {
                let param = self.param(child(branch, tags::PARAM)?)?;
                Ok(Envelope::Response(MethodResponse { param }))
            }
            tags::FAULT => self.fault(branch).map(Envelope::Fault),
            other => Err(DecodeError::shape(format!(
                "unexpected element <{other}> in <methodResponse>"
            ))),
        }
    }

    fn fault(&self, fault: &Element) -> Result<Fault, DecodeError> {
        let mut members = match self.value(child(fault, tags::VALUE)?, 0)? {
            Value::Struct(members) => members,
            _ => return Err(DecodeError::shape("<fault> value is not a struct")),
        };

        let fault_code = match members.remove(tags::FAULT_CODE) {
            Some(Value::Int(code)) => code,
            Some(_) => {
                return Err(DecodeError::InvalidFaultMember {
                    member: tags::FAULT_CODE,
                    expected: "an integer",
                });
            }
            None => {
                return Err(DecodeError::MissingFaultMember {
                    member: tags::FAULT_CODE,
                });
            }
        };

        let fault_string = match members.remove(tags::FAULT_STRING) {
            Some(Value::Str(text)) => text,
            Some(_) => {
                return Err(DecodeError::InvalidFaultMember {
                    member: tags::FAULT_STRING,
                    expected: "a string",
                });
            }
            None => {
                return Err(DecodeError::MissingFaultMember {
                    member: tags::FAULT_STRING,
                });
            }
        };

        Ok(Fault {
            fault_code,
            fault_string,
        })
    }

    fn value(&self, value: &Element, depth: usize) -> Result<Value, DecodeError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(DecodeError::NestingTooDeep {
                max: MAX_NESTING_DEPTH,
            });
        }
        if value.tag != tags::VALUE {
            return Err(DecodeError::shape(format!(
                "expected <value>, found <{}>",
                value.tag
            )));
        }

        match &value.body {
            // Untyped content is a string.
            Body::Text(text) => Ok(Value::Str(text.clone())),
            Body::Elements(children) => match children.as_slice() {
                [] => Ok(Value::Str(String::new())),
                [typed] => self.typed(typed, depth),
                _ => Err(DecodeError::shape("<value> holds more than one element")),
            },
        }
    }

    fn typed(&self, element: &Element, depth: usize) -> Result<Value, DecodeError> {
        match element.tag.as_str() {
            tags::INT | tags::I4 | tags::I8 => Ok(Value::Int(parse_int(leaf_text(element)?)?)),
            tags::DOUBLE => Ok(Value::Double(parse_double(leaf_text(element)?)?)),
            tags::BOOLEAN => Ok(Value::Bool(parse_boolean(leaf_text(element)?)?)),
            tags::STRING => Ok(Value::Str(leaf_text(element)?.to_string())),
            tags::DATETIME => Ok(Value::DateTime(DateTimeRaw::new(leaf_text(element)?))),
            tags::BASE64 => Ok(Value::Binary(BinaryRaw::new(leaf_text(element)?))),
            tags::NIL if self.options.exclude_nil => Err(DecodeError::NilExcluded),
            tags::NIL => Ok(Value::Nil),
            tags::ARRAY => self.array(element, depth),
            tags::STRUCT => self.structure(element, depth),
            other => Err(DecodeError::UnknownTag {
                tag: other.to_string(),
            }),
        }
    }

    fn array(&self, array: &Element, depth: usize) -> Result<Value, DecodeError> {
        let items = match array.child(tags::DATA) {
            Some(data) => data
                .children()
                .iter()
                .map(|item| self.value(item, depth + 1))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };
        Ok(Value::Array(items))
    }

    fn structure(&self, element: &Element, depth: usize) -> Result<Value, DecodeError> {
        let mut members = Struct::new();
        for member in element.children() {
            let name = leaf_text(child(member, tags::NAME)?)?;
            let value = self.value(child(member, tags::VALUE)?, depth + 1)?;
            // Later members overwrite earlier ones with the same name.
            members.insert(name.to_string(), value);
        }
        Ok(Value::Struct(members))
    }
}

fn child<'e>(parent: &'e Element, tag: &str) -> Result<&'e Element, DecodeError> {
    parent
        .child(tag)
        .ok_or_else(|| DecodeError::shape(format!("<{}> without <{}>", parent.tag, tag)))
}

fn leaf_text(element: &Element) -> Result<&str, DecodeError> {
    match &element.body {
        Body::Text(text) => Ok(text),
        Body::Elements(children) if children.is_empty() => Ok(""),
        Body::Elements(_) => Err(DecodeError::shape(format!(
            "<{}> must hold text",
            element.tag
        ))),
    }
}
