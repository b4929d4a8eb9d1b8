//! Base64 conversion for `base64` payloads.
//!
//! Wire payloads are often wrapped at 76 columns or indented along with the
//! surrounding markup, so decoding strips ASCII whitespace and does not
//! insist on padding.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine;

use crate::error::ConversionError;

const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encodes `bytes` as padded standard base64 with no line breaks.
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes base64 text, ignoring any ASCII whitespace inside it.
pub fn decode_base64(text: &str) -> Result<Vec<u8>, ConversionError> {
    let compact: Vec<u8> = text
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    LENIENT
        .decode(&compact)
        .map_err(|e| ConversionError::InvalidBase64 {
            message: e.to_string(),
        })
}
