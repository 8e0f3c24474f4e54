//! Text encodings for byte fields that cross the persistence boundary.
//!
//! Keys, ciphertexts, nonces and salts are stored and transported as
//! standard (padded) base64. The legacy shared-key mode uses lowercase hex
//! for its key, matching what existing stored records contain.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{Result, ShareVaultError};

/// Encode bytes as standard base64.
pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard base64. `field` names the field in the error.
pub fn from_base64(text: &str, field: &'static str) -> Result<Vec<u8>> {
    STANDARD
        .decode(text.trim())
        .map_err(|_| ShareVaultError::Encoding(field))
}

/// Decode base64 into a fixed-size array, rejecting any other length.
pub fn from_base64_array<const N: usize>(text: &str, field: &'static str) -> Result<[u8; N]> {
    let bytes = from_base64(text, field)?;
    bytes
        .try_into()
        .map_err(|_| ShareVaultError::Encoding(field))
}

/// Encode bytes as lowercase hex.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode hex (either case). Odd lengths and non-hex digits are rejected.
pub fn from_hex(text: &str, field: &'static str) -> Result<Vec<u8>> {
    hex::decode(text.trim()).map_err(|_| ShareVaultError::Encoding(field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_rejects_garbage() {
        assert!(from_base64("not base64!!", "ciphertext").is_err());
        assert_eq!(from_base64("", "ciphertext").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_base64_array_length_checked() {
        let twelve = to_base64(&[7u8; 12]);
        let ok: [u8; 12] = from_base64_array(&twelve, "iv").unwrap();
        assert_eq!(ok, [7u8; 12]);

        let sixteen = to_base64(&[7u8; 16]);
        let err = from_base64_array::<12>(&sixteen, "iv").unwrap_err();
        assert!(matches!(err, ShareVaultError::Encoding("iv")));
    }

    #[test]
    fn test_hex() {
        assert_eq!(to_hex(&[0x00, 0xab, 0x7f]), "00ab7f");
        assert_eq!(from_hex("00AB7f", "key").unwrap(), vec![0x00, 0xab, 0x7f]);
        assert!(from_hex("abc", "key").is_err());
        assert!(from_hex("zz", "key").is_err());
        assert_eq!(from_hex(" 0a0b\n", "key").unwrap(), vec![0x0a, 0x0b]);
        assert!(matches!(from_hex("0g", "sharedKey"), Err(ShareVaultError::Encoding("sharedKey"))));
    }
}
