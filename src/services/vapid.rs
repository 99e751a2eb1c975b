//! VAPID application server key decoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Decode a base64url VAPID public key into raw bytes.
///
/// `-` and `_` are mapped to the standard alphabet and `=` padding is added
/// up to a multiple of four, so keys copied without padding decode as-is.
pub fn decode_application_server_key(key: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let mut normalized: String = key
        .trim()
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    while normalized.len() % 4 != 0 {
        normalized.push('=');
    }
    STANDARD.decode(normalized)
}
