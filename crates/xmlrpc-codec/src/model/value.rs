//! Value types for XML-RPC payloads.
//!
//! A [`Value`] is one of the closed set of kinds the wire format carries,
//! plus a single [`Foreign`] fallback for caller-defined types.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use num_bigint::BigInt;

use crate::error::ConversionError;
use crate::grammar::tags;
use crate::model::convert::StructLike;
use crate::util::binary;
use crate::util::datetime::{self, IsoDateTime};

/// Struct members keyed by plain-text name.
pub type Struct = BTreeMap<String, Value>;

/// Value kinds, one per wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Nil,
    Bool,
    Int,
    Double,
    Str,
    DateTime,
    Binary,
    Array,
    Struct,
    Foreign,
}

impl ValueKind {
    /// Returns the wire tag this kind encodes to, or `None` for foreign values.
    pub fn tag(self) -> Option<&'static str> {
        match self {
            ValueKind::Nil => Some(tags::NIL),
            ValueKind::Bool => Some(tags::BOOLEAN),
            ValueKind::Int => Some(tags::INT),
            ValueKind::Double => Some(tags::DOUBLE),
            ValueKind::Str => Some(tags::STRING),
            ValueKind::DateTime => Some(tags::DATETIME),
            ValueKind::Binary => Some(tags::BASE64),
            ValueKind::Array => Some(tags::ARRAY),
            ValueKind::Struct => Some(tags::STRUCT),
            ValueKind::Foreign => None,
        }
    }
}

/// `dateTime.iso8601` text, kept exactly as it appeared on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateTimeRaw(String);

impl DateTimeRaw {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Formats `dt` in the compact `YYYYMMDDTHH:MM:SS` form.
    pub fn from_datetime(dt: &IsoDateTime) -> Self {
        Self(datetime::format_iso8601(dt))
    }

    /// Parses the wrapped text as an ISO 8601 timestamp.
    pub fn to_datetime(&self) -> Result<IsoDateTime, ConversionError> {
        Ok(datetime::parse_iso8601(&self.0)?)
    }
}

impl fmt::Display for DateTimeRaw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `base64` text, kept exactly as it appeared on the wire (whitespace included).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BinaryRaw(String);

impl BinaryRaw {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Wraps the standard base64 encoding of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(binary::encode_base64(bytes))
    }

    /// Decodes the wrapped text, ignoring any ASCII whitespace inside it.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ConversionError> {
        binary::decode_base64(&self.0)
    }
}

impl fmt::Display for BinaryRaw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed output format for a [`FormattedDouble`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatFormat {
    /// `%.Nf`: fixed notation with `decimals` digits after the point.
    Fixed { decimals: usize },
    /// `%.Ne`: scientific notation with `decimals` digits after the point.
    Exponent { decimals: usize },
}

impl FloatFormat {
    /// Renders `value` with this format.
    pub fn render(self, value: f64) -> String {
        match self {
            FloatFormat::Fixed { decimals } => format!("{value:.decimals$}"),
            FloatFormat::Exponent { decimals } => format!("{value:.decimals$e}"),
        }
    }
}

/// A double that is encoded with a caller-chosen format instead of the
/// shortest round-trip representation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormattedDouble {
    pub value: f64,
    pub format: FloatFormat,
}

impl FormattedDouble {
    pub fn new(value: f64, format: FloatFormat) -> Self {
        Self { value, format }
    }

    pub fn render(&self) -> String {
        self.format.render(self.value)
    }
}

/// A caller-defined value with no canonical kind.
///
/// It encodes as a struct when it carries a member view and fails to
/// encode otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Foreign {
    type_name: Cow<'static, str>,
    repr: String,
    members: Option<Vec<(String, Value)>>,
}

impl Foreign {
    pub fn new(
        type_name: impl Into<Cow<'static, str>>,
        repr: impl Into<String>,
        members: Option<Vec<(String, Value)>>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            repr: repr.into(),
            members,
        }
    }

    /// Wraps a value that has no struct view.
    pub fn opaque<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        Self::new(std::any::type_name::<T>(), format!("{value:?}"), None)
    }

    /// Wraps a value through its struct view.
    pub fn from_struct_like<T: StructLike + fmt::Debug + ?Sized>(value: &T) -> Self {
        Self::new(
            std::any::type_name::<T>(),
            format!("{value:?}"),
            Some(value.members()),
        )
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Debug rendering of the wrapped value.
    pub fn repr(&self) -> &str {
        &self.repr
    }

    /// Member view in the order the caller supplied it.
    pub fn members(&self) -> Option<&[(String, Value)]> {
        self.members.as_deref()
    }
}

/// An XML-RPC value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    /// Arbitrary-precision integer; `int`, `i4` and `i8` all decode here.
    Int(BigInt),
    Double(f64),
    FormattedDouble(FormattedDouble),
    Str(String),
    DateTime(DateTimeRaw),
    Binary(BinaryRaw),
    Array(Vec<Value>),
    Struct(Struct),
    Foreign(Foreign),
}

impl Value {
    pub fn int(value: impl Into<BigInt>) -> Self {
        Value::Int(value.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Value::Str(value.into())
    }

    pub fn formatted(value: f64, format: FloatFormat) -> Self {
        Value::FormattedDouble(FormattedDouble::new(value, format))
    }

    pub fn date_time(text: impl Into<String>) -> Self {
        Value::DateTime(DateTimeRaw::new(text))
    }

    pub fn binary(bytes: &[u8]) -> Self {
        Value::Binary(BinaryRaw::from_bytes(bytes))
    }

    /// Returns the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Nil => ValueKind::Nil,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Double(_) | Value::FormattedDouble(_) => ValueKind::Double,
            Value::Str(_) => ValueKind::Str,
            Value::DateTime(_) => ValueKind::DateTime,
            Value::Binary(_) => ValueKind::Binary,
            Value::Array(_) => ValueKind::Array,
            Value::Struct(_) => ValueKind::Struct,
            Value::Foreign(_) => ValueKind::Foreign,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            Value::Int(i) => Some(i),
            _ => None,
        }
    }

    /// Returns the integer if it fits in an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_int().and_then(|i| i64::try_from(i).ok())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(f) => Some(*f),
            Value::FormattedDouble(fd) => Some(fd.value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date_time(&self) -> Option<&DateTimeRaw> {
        match self {
            Value::DateTime(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&BinaryRaw> {
        match self {
            Value::Binary(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Struct> {
        match self {
            Value::Struct(members) => Some(members),
            _ => None,
        }
    }

    /// Looks up a struct member by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_struct().and_then(|members| members.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(Value::Nil.kind().tag(), Some("nil"));
        assert_eq!(Value::Bool(true).kind().tag(), Some("boolean"));
        assert_eq!(Value::int(7).kind().tag(), Some("int"));
        assert_eq!(Value::Double(1.5).kind().tag(), Some("double"));
        assert_eq!(
            Value::formatted(1.5, FloatFormat::Fixed { decimals: 2 }).kind(),
            ValueKind::Double
        );
        assert_eq!(Value::date_time("19980717T14:08:55").kind().tag(), Some("dateTime.iso8601"));
        assert_eq!(Value::binary(b"hi").kind().tag(), Some("base64"));
        assert_eq!(Value::Foreign(Foreign::opaque(&3u8)).kind().tag(), None);
    }

    #[test]
    fn test_float_format_render() {
        assert_eq!(FloatFormat::Fixed { decimals: 2 }.render(3.14159), "3.14");
        assert_eq!(FloatFormat::Fixed { decimals: 0 }.render(2.7), "3");
        assert_eq!(FloatFormat::Exponent { decimals: 3 }.render(1234.56), "1.235e3");
    }

    #[test]
    fn test_accessors() {
        let mut members = Struct::new();
        members.insert("k".to_string(), Value::int(1));
        let value = Value::Struct(members);
        assert_eq!(value.get("k").and_then(Value::as_i64), Some(1));
        assert!(value.get("missing").is_none());
        assert!(Value::Nil.is_nil());
        assert_eq!(Value::string("a").as_str(), Some("a"));
        assert_eq!(Value::int(BigInt::from(i128::MAX)).as_i64(), None);
    }

    #[test]
    fn test_foreign_opaque() {
        #[derive(Debug)]
        struct Handle(u32);

        let foreign = Foreign::opaque(&Handle(9));
        assert!(foreign.type_name().ends_with("Handle"));
        assert_eq!(foreign.repr(), "Handle(9)");
        assert!(foreign.members().is_none());
    }
}
