//! XML-RPC: value model and grammar-checked wire codec.
//!
//! This crate maps XML-RPC documents (method calls, responses and faults) to
//! and from an in-memory value model. It is meant to sit under an HTTP
//! client or server; transport concerns are left to the caller.
//!
//! # Quick Start
//!
//! ```rust
//! use xmlrpc_codec::{decode, encode, DecodeOptions, EncodeOptions, Envelope, MethodCall, Value};
//!
//! let call = MethodCall::builder("examples.getStateName")
//!     .param(41)
//!     .struct_param(|s| s.member("verbose", true))
//!     .build();
//!
//! // Encode to wire bytes
//! let bytes = encode(&call, &EncodeOptions::default()).unwrap().into_bytes();
//!
//! // Decode back
//! let decoded = decode(&bytes, &DecodeOptions::default()).unwrap();
//! match decoded {
//!     Envelope::Call(decoded) => {
//!         assert_eq!(decoded.method_name, "examples.getStateName");
//!         assert_eq!(decoded.params[0], Value::int(41));
//!     }
//!     other => panic!("unexpected envelope: {:?}", other),
//! }
//! ```
//!
//! # Modules
//!
//! - [`model`]: Values, envelopes, conversions and builders
//! - [`codec`]: Encoding, decoding and the output writer
//! - [`grammar`]: The document grammar as a rule table
//! - [`tree`]: Parse trees and the pluggable tree parser
//! - [`util`]: Conversions for the opaque date and binary wrappers
//! - [`error`]: Error types
//! - [`limits`]: Security limits for decoding
//!
//! # Security
//!
//! The decoder is designed to safely handle untrusted input:
//! - Document size and nesting depth are bounded
//! - External entities are never resolved
//! - Every document is checked against the grammar before it is interpreted

pub mod codec;
pub mod error;
pub mod grammar;
pub mod limits;
pub mod model;
pub mod tree;
pub mod util;

// Re-export commonly used types at crate root
pub use codec::{
    decode, decode_or_panic, decode_value_element, decode_with, encode, encode_or_panic,
    DecodeOptions, Encode, EncodeOptions, Encoded, OutputShape,
};
pub use error::{ConversionError, DecodeError, EncodeError, ParseError};
pub use grammar::{grammar, Grammar};
pub use model::{
    BinaryRaw, DateTimeRaw, Envelope, EnvelopeKind, Fault, FloatFormat, Foreign, FormattedDouble,
    MethodCall, MethodCallBuilder, MethodResponse, Struct, StructBuilder, StructLike, ToValue,
    Value, ValueKind,
};
pub use tree::{Element, TreeParser, XmlTreeParser};
pub use util::{DateTimeParseError, IsoDateTime};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
