//! Error types for sharevault.
//!
//! Every variant is a distinct failure mode of the file-sharing core. Error
//! messages are intentionally minimal: they signal *what* failed without
//! revealing *why* in ways that could leak cryptographic state. No variant
//! ever carries key material.

use thiserror::Error;

/// The single error type for all sharevault operations.
#[derive(Debug, Error)]
pub enum ShareVaultError {
    /// The key-pair provider failed to produce or export a key pair.
    #[error("key generation failed")]
    KeyGeneration,

    /// Unwrapping a password-protected private key failed. Covers both a
    /// wrong password and a corrupted wrapped key; the two are deliberately
    /// indistinguishable.
    #[error("invalid password or corrupted private key")]
    InvalidPassword,

    /// Encryption failed: malformed recipient key, oversized payload, or a
    /// failure inside the cipher.
    #[error("encryption failed")]
    Encryption,

    /// Decryption failed. Covers a key mismatch, a tampered envelope and a
    /// failed authentication tag without saying which.
    #[error("cannot decrypt: incorrect key or corrupted data")]
    Decryption,

    /// Imported key material could not be parsed.
    #[error("invalid key")]
    InvalidKey,

    /// A text field (base64, hex) or a fixed-length byte field was malformed.
    #[error("malformed encoding: {0}")]
    Encoding(&'static str),

    /// A caller-supplied password does not meet the password policy.
    #[error("weak password: {0}")]
    WeakPassword(&'static str),

    /// The system's random number generator failed to produce bytes.
    #[error("randomness source failed")]
    RandomnessFailure,

    /// A configuration value is outside its permitted range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The key store rejected or failed an operation.
    #[error("key store error: {0}")]
    Storage(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ShareVaultError>;
