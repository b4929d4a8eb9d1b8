//! Conversions for the opaque `dateTime.iso8601` and `base64` wrappers.

pub mod binary;
pub mod datetime;

pub use binary::{decode_base64, encode_base64};
pub use datetime::{format_iso8601, parse_iso8601, DateTimeParseError, IsoDateTime};
