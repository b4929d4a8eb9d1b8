//! Primitive encoding/decoding for XML-RPC text.
//!
//! Implements leaf literal parsing, text escaping, double formatting and the
//! output writer.

use std::borrow::Cow;

use num_bigint::BigInt;

use crate::error::DecodeError;
use crate::limits::PROLOG;

// =============================================================================
// DECODING
// =============================================================================

/// Strips surrounding XML whitespace.
#[inline]
fn trim_xml(text: &str) -> &str {
    text.trim_matches(|c| matches!(c, ' ' | '\t' | '\r' | '\n'))
}

/// Parses `int`/`i4`/`i8` text: `[+-]?[0-9]+` with no width limit.
pub fn parse_int(text: &str) -> Result<BigInt, DecodeError> {
    let invalid = || DecodeError::InvalidInt {
        text: text.to_string(),
    };

    let trimmed = trim_xml(text);
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let magnitude = BigInt::parse_bytes(digits.as_bytes(), 10).ok_or_else(invalid)?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// Parses `double` text as a decimal floating-point literal.
///
/// Only digits, sign, decimal point and exponent are accepted, so `inf` and
/// `nan` spellings are rejected. Literals that overflow to infinity are
/// rejected too.
pub fn parse_double(text: &str) -> Result<f64, DecodeError> {
    let invalid = || DecodeError::InvalidDouble {
        text: text.to_string(),
    };

    let trimmed = trim_xml(text);
    let well_formed = trimmed.bytes().any(|b| b.is_ascii_digit())
        && trimmed
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'+' | b'-' | b'.' | b'e' | b'E'));
    if !well_formed {
        return Err(invalid());
    }
    let value = trimmed.parse::<f64>().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }
    Ok(value)
}

/// Parses `boolean` text, which must be `0` or `1`.
pub fn parse_boolean(text: &str) -> Result<bool, DecodeError> {
    match trim_xml(text) {
        "1" => Ok(true),
        "0" => Ok(false),
        _ => Err(DecodeError::InvalidBoolean {
            text: text.to_string(),
        }),
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Escapes the five XML special characters.
pub fn escape_text(text: &str) -> Cow<'_, str> {
    if !text.bytes().any(|b| matches!(b, b'&' | b'<' | b'>' | b'"' | b'\'')) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Formats a double as the shortest text that parses back to the same bits.
///
/// Returns `None` for NaN and infinities.
pub fn format_double(value: f64) -> Option<String> {
    // Debug formatting is shortest round-trip and switches to exponent
    // notation for very large and very small magnitudes.
    value.is_finite().then(|| format!("{value:?}"))
}

/// Shape of the encoder output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputShape {
    /// One contiguous buffer.
    #[default]
    Contiguous,
    /// A sequence of chunks to be concatenated (or written vectored) by the caller.
    Chunked,
}

/// Encoder output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoded {
    Contiguous(Vec<u8>),
    Chunked(Vec<Cow<'static, [u8]>>),
}

impl Encoded {
    /// Returns the document as one buffer, concatenating chunks if needed.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Encoded::Contiguous(bytes) => bytes,
            Encoded::Chunked(chunks) => {
                let mut out = Vec::with_capacity(chunks.iter().map(|c| c.len()).sum());
                for chunk in &chunks {
                    out.extend_from_slice(chunk);
                }
                out
            }
        }
    }

    /// Returns the total document length in bytes.
    pub fn len(&self) -> usize {
        match self {
            Encoded::Contiguous(bytes) => bytes.len(),
            Encoded::Chunked(chunks) => chunks.iter().map(|c| c.len()).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the output as slices in document order.
    pub fn chunks(&self) -> Vec<&[u8]> {
        match self {
            Encoded::Contiguous(bytes) => vec![bytes.as_slice()],
            Encoded::Chunked(chunks) => chunks.iter().map(|c| c.as_ref()).collect(),
        }
    }
}

/// Writer for XML-RPC markup.
///
/// Tags are `'static` and are borrowed into chunked output without copying.
#[derive(Debug, Clone)]
pub struct XmlWriter {
    shape: OutputShape,
    buf: Vec<u8>,
    chunks: Vec<Cow<'static, [u8]>>,
    len: usize,
}

impl XmlWriter {
    /// Creates a new writer.
    pub fn new(shape: OutputShape) -> Self {
        Self::with_capacity(shape, 0)
    }

    /// Creates a new writer with capacity.
    pub fn with_capacity(shape: OutputShape, capacity: usize) -> Self {
        let (buf, chunks) = match shape {
            OutputShape::Contiguous => (Vec::with_capacity(capacity), Vec::new()),
            OutputShape::Chunked => (Vec::new(), Vec::with_capacity(capacity / 8)),
        };
        Self {
            shape,
            buf,
            chunks,
            len: 0,
        }
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn push_static(&mut self, bytes: &'static [u8]) {
        self.len += bytes.len();
        match self.shape {
            OutputShape::Contiguous => self.buf.extend_from_slice(bytes),
            OutputShape::Chunked => self.chunks.push(Cow::Borrowed(bytes)),
        }
    }

    #[inline]
    fn push_str(&mut self, text: &str) {
        self.len += text.len();
        match self.shape {
            OutputShape::Contiguous => self.buf.extend_from_slice(text.as_bytes()),
            OutputShape::Chunked => self.chunks.push(Cow::Owned(text.as_bytes().to_vec())),
        }
    }

    #[inline]
    fn push_string(&mut self, text: String) {
        self.len += text.len();
        match self.shape {
            OutputShape::Contiguous => self.buf.extend_from_slice(text.as_bytes()),
            OutputShape::Chunked => self.chunks.push(Cow::Owned(text.into_bytes())),
        }
    }

    /// Writes the XML declaration.
    pub fn prolog(&mut self) {
        self.push_static(PROLOG.as_bytes());
    }

    /// Writes `<tag>`.
    pub fn open(&mut self, tag: &'static str) {
        self.push_static(b"<");
        self.push_static(tag.as_bytes());
        self.push_static(b">");
    }

    /// Writes `</tag>`.
    pub fn close(&mut self, tag: &'static str) {
        self.push_static(b"</");
        self.push_static(tag.as_bytes());
        self.push_static(b">");
    }

    /// Writes `<tag/>`.
    pub fn empty(&mut self, tag: &'static str) {
        self.push_static(b"<");
        self.push_static(tag.as_bytes());
        self.push_static(b"/>");
    }

    /// Writes escaped character data.
    pub fn text(&mut self, text: &str) {
        match escape_text(text) {
            Cow::Borrowed(s) => self.push_str(s),
            Cow::Owned(s) => self.push_string(s),
        }
    }

    /// Writes text that is known to need no escaping (numeric literals).
    pub fn raw(&mut self, text: String) {
        self.push_string(text);
    }

    /// Writes `<tag>text</tag>` with the text escaped.
    pub fn leaf(&mut self, tag: &'static str, text: &str) {
        self.open(tag);
        self.text(text);
        self.close(tag);
    }

    /// Finishes writing and returns the output.
    pub fn finish(self) -> Encoded {
        match self.shape {
            OutputShape::Contiguous => Encoded::Contiguous(self.buf),
            OutputShape::Chunked => Encoded::Chunked(self.chunks),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("42").unwrap(), BigInt::from(42));
        assert_eq!(parse_int(" -17\n").unwrap(), BigInt::from(-17));
        assert_eq!(parse_int("+8").unwrap(), BigInt::from(8));
        assert_eq!(
            parse_int("170141183460469231731687303715884105728").unwrap(),
            BigInt::from(i128::MAX) + 1u32
        );
        for bad in ["", "-", "1.0", "0x10", "1 2", "--1", "١"] {
            assert!(
                matches!(parse_int(bad), Err(DecodeError::InvalidInt { .. })),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_parse_double() {
        assert_eq!(parse_double("1.5").unwrap(), 1.5);
        assert_eq!(parse_double("-0.0").unwrap().to_bits(), (-0.0f64).to_bits());
        assert_eq!(parse_double(" 1e300 ").unwrap(), 1e300);
        assert_eq!(parse_double("42").unwrap(), 42.0);
        for bad in ["", "abc", "inf", "NaN", "1e", "1.2.3", ".", "1e400", "-1e400"] {
            assert!(
                matches!(parse_double(bad), Err(DecodeError::InvalidDouble { .. })),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_parse_boolean() {
        assert!(parse_boolean("1").unwrap());
        assert!(!parse_boolean(" 0 ").unwrap());
        let err = parse_boolean("true").unwrap_err();
        assert_eq!(
            err.message(),
            "invalid boolean literal \"true\" (expected \"0\" or \"1\")"
        );
    }

    #[test]
    fn test_escape_text() {
        assert!(matches!(escape_text("plain"), Cow::Borrowed("plain")));
        assert_eq!(
            escape_text("a<b>&\"c\"'d'"),
            "a&lt;b&gt;&amp;&quot;c&quot;&apos;d&apos;"
        );
    }

    #[test]
    fn test_format_double() {
        assert_eq!(format_double(1.0).as_deref(), Some("1.0"));
        assert_eq!(format_double(0.1).as_deref(), Some("0.1"));
        assert_eq!(format_double(-2.5).as_deref(), Some("-2.5"));
        assert_eq!(format_double(f64::NAN), None);
        assert_eq!(format_double(f64::INFINITY), None);
        for v in [1e300, 5e-324, f64::MAX, f64::MIN_POSITIVE, 0.1 + 0.2] {
            let text = format_double(v).unwrap();
            assert_eq!(parse_double(&text).unwrap().to_bits(), v.to_bits(), "{}", text);
        }
    }

    #[test]
    fn test_writer_shapes_agree() {
        let write = |shape| {
            let mut w = XmlWriter::new(shape);
            w.prolog();
            w.open("value");
            w.leaf("string", "a&b");
            w.empty("nil");
            w.raw("12".to_string());
            w.close("value");
            w
        };

        let contiguous = write(OutputShape::Contiguous);
        let chunked = write(OutputShape::Chunked);
        assert_eq!(contiguous.len(), chunked.len());

        let contiguous = contiguous.finish();
        let chunked = chunked.finish();
        assert!(matches!(chunked, Encoded::Chunked(_)));
        assert!(chunked.chunks().len() > 1);
        assert_eq!(contiguous.len(), chunked.len());

        let expected = format!("{PROLOG}<value><string>a&amp;b</string><nil/>12</value>");
        assert_eq!(contiguous.into_bytes(), expected.as_bytes());
        assert_eq!(chunked.into_bytes(), expected.as_bytes());
    }
}
