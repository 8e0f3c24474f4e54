//! # sharevault
//!
//! Hybrid file encryption for secure file sharing.
//!
//! Every user owns an RSA-OAEP key pair. The private half is only ever
//! stored wrapped under a password (PBKDF2-SHA256 + AES-256-GCM). Each file
//! is encrypted with a fresh AES-256-GCM content key, and that content key
//! is wrapped with the recipient's public key.
//!
//! ```text
//! generate_key_pair()                 -> KeyPair { public, private, key_id }
//! wrap_private_key(private, pw)       -> WrappedPrivateKey { ct, salt, iv }
//! encrypt_for_recipient(bytes, pub)   -> EncryptedEnvelope { ct, wrapped key, iv }
//! unwrap_private_key(wrapped, pw)     -> PrivateKey
//! decrypt_with_private_key(env, priv) -> bytes
//! ```
//!
//! ## Public API
//!
//! The functions at the crate root use [`Config::default`]. Hosts that need
//! other parameters construct [`KeyPairService`] and [`EnvelopeCipher`]
//! directly. Storage is the host's concern: byte fields have base64
//! `Encoded*` forms for JSON persistence, and [`store::KeyStore`] is the
//! seam for key records.

// Module declarations.
pub(crate) mod asymmetric;
pub mod audit;
pub mod config;
pub(crate) mod crypto;
pub mod encoding;
pub mod envelope;
pub mod error;
pub(crate) mod kdf;
pub mod keypair;
pub mod keys;
pub mod legacy;
pub mod pending;
pub mod share;
pub mod store;

#[cfg(test)]
mod testutil;

pub use config::Config;
pub use envelope::{EncodedEnvelope, EncryptedEnvelope, EnvelopeCipher, SealedFile};
pub use error::{Result, ShareVaultError};
pub use keypair::{EncodedWrappedKey, KeyPairService, PasswordPolicy, WrappedPrivateKey};
pub use keys::{KeyId, KeyPair, PrivateKey, PublicKey};
pub use pending::PendingDecrypt;
pub use share::{PendingDownload, SecureShare};

/// Generate an RSA-2048 OAEP key pair.
pub fn generate_key_pair() -> Result<KeyPair> {
    KeyPairService::default().generate()
}

/// Protect `private_key` with `password`. Check the password against a
/// [`PasswordPolicy`] first; this function accepts any password.
pub fn wrap_private_key(private_key: &PrivateKey, password: &str) -> Result<WrappedPrivateKey> {
    KeyPairService::default().wrap(private_key, password)
}

/// Recover a private key. Fails with [`ShareVaultError::InvalidPassword`].
pub fn unwrap_private_key(wrapped: &WrappedPrivateKey, password: &str) -> Result<PrivateKey> {
    KeyPairService::default().unwrap(wrapped, password)
}

/// Encrypt `plaintext` for the holder of `public_key`.
pub fn encrypt_for_recipient(plaintext: &[u8], public_key: &PublicKey) -> Result<EncryptedEnvelope> {
    EnvelopeCipher::default().encrypt(plaintext, public_key)
}

/// Decrypt an envelope. Fails with [`ShareVaultError::Decryption`].
pub fn decrypt_with_private_key(envelope: &EncryptedEnvelope, private_key: &PrivateKey) -> Result<Vec<u8>> {
    EnvelopeCipher::default().decrypt(envelope, private_key)
}

/// Start a two-phase decrypt; complete it with the password once the user
/// has supplied it.
pub fn begin_decrypt(envelope: EncryptedEnvelope, wrapped: WrappedPrivateKey) -> PendingDecrypt {
    KeyPairService::default().begin_decrypt(&EnvelopeCipher::default(), envelope, wrapped)
}
