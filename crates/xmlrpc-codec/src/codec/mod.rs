//! XML-RPC encoding/decoding.
//!
//! Decoding goes through a grammar-validating [`TreeParser`](crate::tree::TreeParser)
//! and then walks the validated tree. Encoding writes canonical markup with
//! no insignificant whitespace.

pub mod decode;
pub mod encode;
pub mod primitives;

pub use decode::{decode, decode_or_panic, decode_value_element, decode_with, DecodeOptions};
pub use encode::{encode, encode_or_panic, write_value, Encode, EncodeOptions};
pub use primitives::{escape_text, format_double, Encoded, OutputShape, XmlWriter};
