//! Hybrid (RSA-OAEP + AES-256-GCM) encryption of file payloads.
//!
//! ```text
//! encrypt: k   <- 32 random bytes            (one per call, never reused)
//!          iv  <- 12 random bytes
//!          ct  <- AES-256-GCM(k, iv, plaintext)
//!          wk  <- RSA-OAEP-SHA256(recipient_public, k)
//!          -> { ct, wk, iv }
//! decrypt: k   <- RSA-OAEP-SHA256^-1(private, wk)
//!          pt  <- AES-256-GCM^-1(k, iv, ct)
//! ```
//!
//! All three fields are required for decryption. There is no key recovery.
//! The whole payload is held in memory; there is no streaming mode.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::asymmetric;
use crate::config::Config;
use crate::crypto::{self, NONCE_LEN};
use crate::encoding;
use crate::error::{Result, ShareVaultError};
use crate::keys::{self, KeyId, PrivateKey, PublicKey, SymmetricKey};

/// The output of one hybrid encryption. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedEnvelope {
    /// AES-256-GCM ciphertext with the tag appended.
    pub ciphertext: Vec<u8>,
    /// The content key, RSA-OAEP encrypted for the recipient.
    pub wrapped_content_key: Vec<u8>,
    pub iv: [u8; NONCE_LEN],
    /// Which key pair the content key was wrapped for. A reference only.
    pub recipient_key_id: Option<KeyId>,
}

/// Text form of an [`EncryptedEnvelope`], every byte field base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedEnvelope {
    pub encrypted_data: String,
    #[serde(rename = "encryptedAESKey")]
    pub encrypted_aes_key: String,
    pub iv: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_key_id: Option<KeyId>,
}

impl EncryptedEnvelope {
    pub fn to_encoded(&self) -> EncodedEnvelope {
        EncodedEnvelope {
            encrypted_data: encoding::to_base64(&self.ciphertext),
            encrypted_aes_key: encoding::to_base64(&self.wrapped_content_key),
            iv: encoding::to_base64(&self.iv),
            recipient_key_id: self.recipient_key_id.clone(),
        }
    }

    pub fn from_encoded(encoded: &EncodedEnvelope) -> Result<Self> {
        Ok(Self {
            ciphertext: encoding::from_base64(&encoded.encrypted_data, "encryptedData")?,
            wrapped_content_key: encoding::from_base64(&encoded.encrypted_aes_key, "encryptedAESKey")?,
            iv: encoding::from_base64_array(&encoded.iv, "iv")?,
            recipient_key_id: encoded.recipient_key_id.clone(),
        })
    }
}

/// File metadata persisted alongside an envelope so a download can restore
/// the original name and type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedFile {
    pub name: String,
    pub mime_type: String,
    /// Plaintext size in bytes.
    pub size: u64,
    pub envelope: EncryptedEnvelope,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedSealedFile {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: u64,
    #[serde(flatten)]
    pub envelope: EncodedEnvelope,
}

impl SealedFile {
    pub fn to_encoded(&self) -> EncodedSealedFile {
        EncodedSealedFile {
            name: self.name.clone(),
            mime_type: self.mime_type.clone(),
            size: self.size,
            envelope: self.envelope.to_encoded(),
        }
    }

    pub fn from_encoded(encoded: &EncodedSealedFile) -> Result<Self> {
        Ok(Self {
            name: encoded.name.clone(),
            mime_type: encoded.mime_type.clone(),
            size: encoded.size,
            envelope: EncryptedEnvelope::from_encoded(&encoded.envelope)?,
        })
    }
}

/// A decrypted file with its restored metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Hybrid encryption of payloads for a recipient public key.
#[derive(Debug, Clone, Default)]
pub struct EnvelopeCipher {
    config: Config,
}

impl EnvelopeCipher {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Encrypt `plaintext` for `recipient`. The envelope carries no key id.
    pub fn encrypt(&self, plaintext: &[u8], recipient: &PublicKey) -> Result<EncryptedEnvelope> {
        self.encrypt_for(plaintext, recipient, None)
    }

    /// Encrypt `plaintext` for `recipient`, recording `recipient_key_id`.
    pub fn encrypt_for(
        &self,
        plaintext: &[u8],
        recipient: &PublicKey,
        recipient_key_id: Option<KeyId>,
    ) -> Result<EncryptedEnvelope> {
        if plaintext.len() > self.config.max_payload_bytes {
            warn!(
                len = plaintext.len(),
                limit = self.config.max_payload_bytes,
                "payload exceeds limit"
            );
            return Err(ShareVaultError::Encryption);
        }

        let content_key = SymmetricKey::generate()?;
        let iv = crypto::generate_nonce()?;
        let ciphertext = crypto::seal(content_key.as_bytes(), iv, plaintext)?;
        let wrapped_content_key = asymmetric::wrap_key(recipient.as_der(), content_key.as_bytes())?;
        drop(content_key);

        debug!(
            plaintext_len = plaintext.len(),
            recipient = recipient_key_id.as_ref().map(KeyId::as_str).unwrap_or("-"),
            "sealed envelope"
        );

        Ok(EncryptedEnvelope {
            ciphertext,
            wrapped_content_key,
            iv,
            recipient_key_id,
        })
    }

    /// Decrypt an envelope. Every failure is `Decryption`, whichever stage
    /// it came from.
    pub fn decrypt(&self, envelope: &EncryptedEnvelope, private_key: &PrivateKey) -> Result<Vec<u8>> {
        let result = Self::try_decrypt(envelope, private_key);
        match &result {
            Ok(plaintext) => debug!(plaintext_len = plaintext.len(), "opened envelope"),
            Err(_) => warn!("envelope decryption failed"),
        }
        result.map_err(|_| ShareVaultError::Decryption)
    }

    fn try_decrypt(envelope: &EncryptedEnvelope, private_key: &PrivateKey) -> Result<Vec<u8>> {
        let raw_key = asymmetric::unwrap_key(private_key.as_der(), &envelope.wrapped_content_key)?;
        let content_key = keys::content_key_from(&raw_key, ShareVaultError::Decryption)?;
        drop(raw_key);
        crypto::open(content_key.as_bytes(), envelope.iv, &envelope.ciphertext)
    }

    /// Encrypt a named file for `recipient`.
    pub fn seal_file(
        &self,
        name: &str,
        mime_type: &str,
        bytes: &[u8],
        recipient: &PublicKey,
        recipient_key_id: Option<KeyId>,
    ) -> Result<SealedFile> {
        let envelope = self.encrypt_for(bytes, recipient, recipient_key_id)?;
        Ok(SealedFile {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            size: bytes.len() as u64,
            envelope,
        })
    }

    /// Decrypt a sealed file and restore its metadata.
    pub fn open_file(&self, file: &SealedFile, private_key: &PrivateKey) -> Result<DecryptedFile> {
        let bytes = self.decrypt(&file.envelope, private_key)?;
        Ok(DecryptedFile {
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            bytes,
        })
    }
}
