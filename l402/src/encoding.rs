//! Base64url decoding for macaroon tokens.
//!
//! L402 servers are inconsistent about the encoding they use for the token:
//! some emit unpadded base64url, some padded base64url, some the standard
//! alphabet. [`decode_base64url`] normalizes all three before decoding.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE as b64;

use crate::error::L402Error;

/// Normalizes a base64 token to canonical, padded base64url.
///
/// Trims surrounding whitespace, maps `+` and `/` to `-` and `_`, strips any
/// existing trailing `=` and re-pads to a multiple of four characters.
#[must_use]
pub fn repair_padding(input: &str) -> String {
    let trimmed = input.trim().trim_end_matches('=');
    let mut repaired: String = trimmed
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    let missing = (4 - repaired.len() % 4) % 4;
    repaired.extend(std::iter::repeat_n('=', missing));
    repaired
}

/// Decodes a base64url token into raw bytes after [`repair_padding`].
///
/// # Errors
///
/// Returns [`L402Error::InvalidEncoding`] if the input contains characters
/// outside the alphabet or has an impossible length.
pub fn decode_base64url(input: &str) -> Result<Vec<u8>, L402Error> {
    Ok(b64.decode(repair_padding(input))?)
}
