//! Safety limits for decoding untrusted documents.

/// Maximum accepted document length in bytes (64 MiB).
pub const MAX_DOCUMENT_SIZE: usize = 64 * 1024 * 1024;

/// Maximum nesting depth of values, counting arrays and structs inside one
/// another. Enforced by the decoder when walking nested values.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Maximum element nesting depth, enforced by the XML tree parser and the
/// grammar check.
///
/// Each array or struct level spans three elements (`value`, `array`, `data`
/// or `value`, `struct`, `member`) and the envelope adds three more, so every
/// document within [`MAX_NESTING_DEPTH`] fits.
pub const MAX_ELEMENT_DEPTH: usize = 3 * (MAX_NESTING_DEPTH + 2);

/// XML declaration emitted at the start of every encoded document.
pub const PROLOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
