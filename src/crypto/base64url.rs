//! Base64url helpers (RFC 4648 §5, unpadded output)

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::error::Result;

/// URL-safe engine that writes no padding and reads input with or without it
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Base64url encode bytes without padding.
#[must_use]
pub fn base64url_encode(data: &[u8]) -> String {
    URL_SAFE_LENIENT.encode(data)
}

/// Base64url decode a string to bytes.
///
/// # Errors
/// Returns `AuthError::Base64` if the input holds characters outside the
/// URL-safe alphabet or has an impossible length.
pub fn base64url_decode(s: &str) -> Result<Vec<u8>> {
    Ok(URL_SAFE_LENIENT.decode(s)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let data = b"Hello, World!";
        let encoded = base64url_encode(data);
        let decoded = base64url_decode(&encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn round_trip_all_byte_values() {
        let data: Vec<u8> = (0..=255).collect();
        assert_eq!(base64url_decode(&base64url_encode(&data)).unwrap(), data);
    }

    #[test]
    fn no_padding() {
        let encoded = base64url_encode(b"ab");
        assert_eq!(encoded, "YWI");
    }

    #[test]
    fn url_safe_chars() {
        // Bytes that would produce + and / in standard base64
        let data = vec![0xfb, 0xff, 0xfe];
        let encoded = base64url_encode(&data);
        assert_eq!(encoded, "-__-");
    }

    #[test]
    fn accepts_padded_input() {
        assert_eq!(base64url_decode("YWI=").unwrap(), b"ab");
        assert_eq!(base64url_decode("YWI").unwrap(), b"ab");
    }

    #[test]
    fn rejects_standard_alphabet() {
        assert!(base64url_decode("+/+/").is_err());
    }

    #[test]
    fn empty_input() {
        assert_eq!(base64url_encode(b""), "");
        assert_eq!(base64url_decode("").unwrap(), Vec::<u8>::new());
    }
}
