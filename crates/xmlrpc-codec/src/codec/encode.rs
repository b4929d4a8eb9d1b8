//! Encoding of envelopes and values into wire text.

use tracing::debug;

use crate::codec::primitives::{format_double, Encoded, OutputShape, XmlWriter};
use crate::error::EncodeError;
use crate::grammar::tags;
use crate::model::{Envelope, Fault, MethodCall, MethodResponse, Value};

/// Options for encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Fail on [`Value::Nil`] instead of emitting `<nil/>`.
    pub exclude_nil: bool,
    /// Whether output is one buffer or a chunk sequence. Does not change the bytes.
    pub output: OutputShape,
}

impl EncodeOptions {
    /// Creates default encoding options (nil allowed, contiguous output).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude_nil(mut self, exclude_nil: bool) -> Self {
        self.exclude_nil = exclude_nil;
        self
    }

    pub fn output(mut self, output: OutputShape) -> Self {
        self.output = output;
        self
    }
}

/// Types that can be written as XML-RPC.
///
/// Envelopes write a complete document, prolog included. [`Value`] writes a
/// bare `<value>` fragment.
pub trait Encode {
    fn encode_into(&self, writer: &mut XmlWriter, options: &EncodeOptions) -> Result<(), EncodeError>;
}

/// Encodes `item`, returning either the complete output or the first error.
pub fn encode<T: Encode + ?Sized>(item: &T, options: &EncodeOptions) -> Result<Encoded, EncodeError> {
    debug!(exclude_nil = options.exclude_nil, "encoding xml-rpc document");

    let mut writer = XmlWriter::new(options.output);
    match item.encode_into(&mut writer, options) {
        Ok(()) => {
            debug!(len = writer.len(), output = ?options.output, "encoded xml-rpc document");
            Ok(writer.finish())
        }
        Err(err) => {
            debug!(error = %err, "failed to encode xml-rpc document");
            Err(err)
        }
    }
}

/// Encodes `item`, panicking with the diagnostic on failure.
pub fn encode_or_panic<T: Encode + ?Sized>(item: &T, options: &EncodeOptions) -> Encoded {
    encode(item, options).unwrap_or_else(|err| panic!("{}", err))
}

impl Encode for Envelope {
    fn encode_into(&self, writer: &mut XmlWriter, options: &EncodeOptions) -> Result<(), EncodeError> {
        match self {
            Envelope::Call(call) => call.encode_into(writer, options),
            Envelope::Response(response) => response.encode_into(writer, options),
            Envelope::Fault(fault) => fault.encode_into(writer, options),
        }
    }
}

impl Encode for MethodCall {
    fn encode_into(&self, writer: &mut XmlWriter, options: &EncodeOptions) -> Result<(), EncodeError> {
        writer.prolog();
        writer.open(tags::METHOD_CALL);
        writer.leaf(tags::METHOD_NAME, &self.method_name);
        writer.open(tags::PARAMS);
        for param in &self.params {
            writer.open(tags::PARAM);
            write_value(writer, param, options)?;
            writer.close(tags::PARAM);
        }
        writer.close(tags::PARAMS);
        writer.close(tags::METHOD_CALL);
        Ok(())
    }
}

impl Encode for MethodResponse {
    fn encode_into(&self, writer: &mut XmlWriter, options: &EncodeOptions) -> Result<(), EncodeError> {
        writer.prolog();
        writer.open(tags::METHOD_RESPONSE);
        writer.open(tags::PARAMS);
        writer.open(tags::PARAM);
        write_value(writer, &self.param, options)?;
        writer.close(tags::PARAM);
        writer.close(tags::PARAMS);
        writer.close(tags::METHOD_RESPONSE);
        Ok(())
    }
}

impl Encode for Fault {
    fn encode_into(&self, writer: &mut XmlWriter, options: &EncodeOptions) -> Result<(), EncodeError> {
        writer.prolog();
        writer.open(tags::METHOD_RESPONSE);
        writer.open(tags::FAULT);
        write_value(writer, &self.to_value(), options)?;
        writer.close(tags::FAULT);
        writer.close(tags::METHOD_RESPONSE);
        Ok(())
    }
}

impl Encode for Value {
    fn encode_into(&self, writer: &mut XmlWriter, options: &EncodeOptions) -> Result<(), EncodeError> {
        write_value(writer, self, options)
    }
}

/// Writes `<value>...</value>` for `value`.
pub fn write_value(
    writer: &mut XmlWriter,
    value: &Value,
    options: &EncodeOptions,
) -> Result<(), EncodeError> {
    writer.open(tags::VALUE);
    match value {
        Value::Nil => {
            if options.exclude_nil {
                return Err(EncodeError::nil_excluded(value));
            }
            writer.empty(tags::NIL);
        }
        Value::Bool(b) => writer.leaf(tags::BOOLEAN, if *b { "1" } else { "0" }),
        Value::Int(i) => {
            writer.open(tags::INT);
            writer.raw(i.to_string());
            writer.close(tags::INT);
        }
        Value::Double(f) => {
            let text = format_double(*f).ok_or_else(|| EncodeError::non_finite(value))?;
            writer.open(tags::DOUBLE);
            writer.raw(text);
            writer.close(tags::DOUBLE);
        }
        Value::FormattedDouble(fd) => {
            if !fd.value.is_finite() {
                return Err(EncodeError::non_finite(value));
            }
            writer.leaf(tags::DOUBLE, &fd.render());
        }
        Value::Str(s) => writer.leaf(tags::STRING, s),
        Value::DateTime(dt) => writer.leaf(tags::DATETIME, dt.as_str()),
        Value::Binary(bin) => writer.leaf(tags::BASE64, bin.as_str()),
        Value::Array(items) => {
            writer.open(tags::ARRAY);
            writer.open(tags::DATA);
            for item in items {
                write_value(writer, item, options)?;
            }
            writer.close(tags::DATA);
            writer.close(tags::ARRAY);
        }
        Value::Struct(members) => {
            write_struct(writer, members.iter().map(|(k, v)| (k.as_str(), v)), options)?;
        }
        Value::Foreign(foreign) => match foreign.members() {
            Some(members) => {
                write_struct(writer, members.iter().map(|(k, v)| (k.as_str(), v)), options)?;
            }
            None => return Err(EncodeError::unencodable(value, foreign.type_name())),
        },
    }
    writer.close(tags::VALUE);
    Ok(())
}

fn write_struct<'a>(
    writer: &mut XmlWriter,
    members: impl Iterator<Item = (&'a str, &'a Value)>,
    options: &EncodeOptions,
) -> Result<(), EncodeError> {
    writer.open(tags::STRUCT);
    for (name, value) in members {
        writer.open(tags::MEMBER);
        writer.leaf(tags::NAME, name);
        write_value(writer, value, options)?;
        writer.close(tags::MEMBER);
    }
    writer.close(tags::STRUCT);
    Ok(())
}
