//! Data model types for XML-RPC.
//!
//! This module contains the in-memory representation of wire documents:
//! - Values (the closed set of scalar and compound kinds)
//! - Envelopes (method calls, responses and faults)
//! - Conversions from Rust types
//! - Builders (ergonomic construction)

pub mod builder;
pub mod convert;
pub mod envelope;
pub mod value;

pub use builder::{MethodCallBuilder, StructBuilder};
pub use convert::{StructLike, ToValue};
pub use envelope::{Envelope, EnvelopeKind, Fault, MethodCall, MethodResponse};
pub use value::{
    BinaryRaw, DateTimeRaw, FloatFormat, Foreign, FormattedDouble, Struct, Value, ValueKind,
};
