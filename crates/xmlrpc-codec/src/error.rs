//! Error types for XML-RPC decoding, encoding and wrapper conversion.

use thiserror::Error;

use crate::model::Value;
use crate::util::datetime::DateTimeParseError;

/// Structured diagnostic produced by a [`TreeParser`](crate::tree::TreeParser).
///
/// The message is kept verbatim so that callers see exactly what the
/// underlying XML reader or grammar check reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    /// Creates a parse error with the given diagnostic text.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error during decoding of a wire document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// Structural violation reported by the tree parser.
    #[error("{message}")]
    Parse { message: String },

    #[error("unsupported value type <{tag}>")]
    UnknownTag { tag: String },

    #[error("<nil/> is not accepted when nil values are excluded")]
    NilExcluded,

    #[error("fault struct is missing the `{member}` member")]
    MissingFaultMember { member: &'static str },

    #[error("fault member `{member}` must be {expected}")]
    InvalidFaultMember {
        member: &'static str,
        expected: &'static str,
    },

    #[error("invalid boolean literal {text:?} (expected \"0\" or \"1\")")]
    InvalidBoolean { text: String },

    #[error("invalid double literal {text:?}")]
    InvalidDouble { text: String },

    #[error("invalid integer literal {text:?}")]
    InvalidInt { text: String },

    /// The parse tree does not have the shape the grammar promises.
    ///
    /// Only reachable with a substituted parser that hands over trees it
    /// did not validate.
    #[error("malformed document: {context}")]
    UnexpectedShape { context: String },

    #[error("document length {len} exceeds maximum {max}")]
    InputTooLarge { len: usize, max: usize },

    #[error("value nesting exceeds maximum depth {max}")]
    NestingTooDeep { max: usize },
}

impl DecodeError {
    /// Returns the human-readable diagnostic for this error.
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub(crate) fn shape(context: impl Into<String>) -> Self {
        DecodeError::UnexpectedShape {
            context: context.into(),
        }
    }
}

impl From<ParseError> for DecodeError {
    fn from(err: ParseError) -> Self {
        DecodeError::Parse {
            message: err.message,
        }
    }
}

/// Error during encoding, carrying the value that could not be encoded.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}: {value:?}")]
pub struct EncodeError {
    pub value: Value,
    pub message: String,
}

impl EncodeError {
    /// Creates an encode error for `value`.
    pub fn new(value: Value, message: impl Into<String>) -> Self {
        Self {
            value,
            message: message.into(),
        }
    }

    pub(crate) fn unencodable(value: &Value, type_name: &str) -> Self {
        Self::new(
            value.clone(),
            format!("value of type `{type_name}` has no XML-RPC mapping and no struct view"),
        )
    }

    pub(crate) fn nil_excluded(value: &Value) -> Self {
        Self::new(value.clone(), "nil cannot be encoded when nil values are excluded")
    }

    pub(crate) fn non_finite(value: &Value) -> Self {
        Self::new(value.clone(), "non-finite double has no XML-RPC representation")
    }
}

/// Error converting an opaque wrapper to a richer representation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("invalid base64 payload: {message}")]
    InvalidBase64 { message: String },

    #[error(transparent)]
    InvalidDateTime(#[from] DateTimeParseError),
}
