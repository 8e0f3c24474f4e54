//! Legacy shared-key file encryption.
//!
//! Deprecated in favour of [`crate::envelope::EnvelopeCipher`]. The file key
//! is chosen by the sender and handed to every recipient out of band, so
//! anyone who ever saw the key can read every file encrypted under it and
//! there is no per-recipient wrapping. Kept only to open files shared this
//! way before key pairs existed.
//!
//! Nonce and AEAD discipline are the same as the hybrid mode: AES-256-GCM,
//! fresh 12-byte nonce per call.

#![allow(deprecated)]

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;
use zeroize::Zeroizing;

use crate::crypto::{self, NONCE_LEN};
use crate::encoding;
use crate::error::{Result, ShareVaultError};
use crate::keys::SymmetricKey;

/// A pre-shared 256-bit key, exchanged as 64 hex characters.
pub struct SharedKey(SymmetricKey);

impl SharedKey {
    /// A fresh random key, to be handed to recipients out of band.
    pub fn generate() -> Result<Self> {
        Ok(Self(SymmetricKey::generate()?))
    }

    /// Import a key from 64 hex characters. Any other length is `InvalidKey`.
    pub fn from_hex(text: &str) -> Result<Self> {
        let bytes = Zeroizing::new(encoding::from_hex(text, "sharedKey")?);
        SymmetricKey::from_slice(&bytes)
            .map(Self)
            .ok_or(ShareVaultError::InvalidKey)
    }

    /// Hex text form, zeroised when dropped.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(encoding::to_hex(self.0.as_bytes()))
    }
}

impl fmt::Debug for SharedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedKey([REDACTED])")
    }
}

/// Output of [`SymmetricCipher::encrypt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyEncryptedFile {
    pub ciphertext: Vec<u8>,
    pub iv: [u8; NONCE_LEN],
}

/// Text form of a [`LegacyEncryptedFile`], both fields base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedLegacyFile {
    pub encrypted_data: String,
    pub iv: String,
}

impl LegacyEncryptedFile {
    /// Base64 form for persistence.
    pub fn to_encoded(&self) -> EncodedLegacyFile {
        EncodedLegacyFile {
            encrypted_data: encoding::to_base64(&self.ciphertext),
            iv: encoding::to_base64(&self.iv),
        }
    }

    /// Decode a persisted file. A malformed field is `Encoding`.
    pub fn from_encoded(encoded: &EncodedLegacyFile) -> Result<Self> {
        Ok(Self {
            ciphertext: encoding::from_base64(&encoded.encrypted_data, "encryptedData")?,
            iv: encoding::from_base64_array(&encoded.iv, "iv")?,
        })
    }
}

/// Shared-key file cipher.
#[deprecated(note = "shared keys expose every file to every key holder; use EnvelopeCipher")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SymmetricCipher;

impl SymmetricCipher {
    /// Encrypt under `key` with a fresh nonce.
    pub fn encrypt(&self, plaintext: &[u8], key: &SharedKey) -> Result<LegacyEncryptedFile> {
        let iv = crypto::generate_nonce()?;
        let ciphertext = crypto::seal(key.0.as_bytes(), iv, plaintext)?;
        Ok(LegacyEncryptedFile { ciphertext, iv })
    }

    /// Decrypt a file. A wrong key or any tampering is `Decryption`.
    pub fn decrypt(&self, file: &LegacyEncryptedFile, key: &SharedKey) -> Result<Vec<u8>> {
        crypto::open(key.0.as_bytes(), file.iv, &file.ciphertext).map_err(|_| {
            warn!("legacy decryption failed");
            ShareVaultError::Decryption
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_through_hex_key() {
        let key = SharedKey::generate().unwrap();
        let hex = key.to_hex();
        assert_eq!(hex.len(), 64);

        let file = SymmetricCipher.encrypt(b"minutes", &key).unwrap();
        let same_key = SharedKey::from_hex(&hex).unwrap();
        assert_eq!(SymmetricCipher.decrypt(&file, &same_key).unwrap(), b"minutes");
    }

    #[test]
    fn test_wrong_key_fails() {
        let file = SymmetricCipher
            .encrypt(b"minutes", &SharedKey::generate().unwrap())
            .unwrap();
        let other = SharedKey::generate().unwrap();
        assert!(matches!(
            SymmetricCipher.decrypt(&file, &other),
            Err(ShareVaultError::Decryption)
        ));
    }

    #[test]
    fn test_key_length_enforced() {
        assert!(matches!(
            SharedKey::from_hex("abcd"),
            Err(ShareVaultError::InvalidKey)
        ));
    }

    #[test]
    fn test_encoded_roundtrip() {
        let key = SharedKey::generate().unwrap();
        let file = SymmetricCipher.encrypt(&[], &key).unwrap();
        let encoded = file.to_encoded();
        let decoded = LegacyEncryptedFile::from_encoded(&encoded).unwrap();
        assert_eq!(decoded, file);
        assert!(SymmetricCipher.decrypt(&decoded, &key).unwrap().is_empty());
    }
}
