//! Key ownership.
//!
//! Key material is held in types that are opaque, non-cloneable where the
//! material is secret, redacted in `Debug`, and zeroised on drop:
//!
//! - [`SymmetricKey`]: a 256-bit AES key (content keys, password-derived keys).
//! - [`PublicKey`]: an RSA public key as SPKI DER. Freely shareable.
//! - [`PrivateKey`]: an RSA private key as PKCS#8 DER. Never persisted in
//!   this form; see `keypair::WrappedPrivateKey`.
//! - [`KeyPair`]: both halves plus a [`KeyId`].

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::asymmetric;
use crate::crypto::{self, KEY_LEN};
use crate::encoding;
use crate::error::{Result, ShareVaultError};

// ---------------------------------------------------------------------------
// Symmetric key
// ---------------------------------------------------------------------------

/// A 256-bit symmetric key.
///
/// - Not `Clone`.
/// - Zeroised on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    bytes: [u8; KEY_LEN],
}

impl SymmetricKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Generate a fresh random key.
    pub(crate) fn generate() -> Result<Self> {
        Ok(Self::from_bytes(crypto::generate_random_key()?))
    }

    /// Rebuild a key from a slice, rejecting any length other than 32.
    pub(crate) fn from_slice(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; KEY_LEN] = bytes.try_into().ok()?;
        Some(Self::from_bytes(bytes))
    }

    /// `pub(crate)`: raw bytes never leave the crate.
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey([REDACTED])")
    }
}

// ---------------------------------------------------------------------------
// Key id
// ---------------------------------------------------------------------------

/// Identifier attached to a key pair at generation time.
///
/// Format: `key_{unix_millis}_{9 base36 chars}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyId(String);

impl KeyId {
    /// Mint a new id from the current time and the system CSPRNG.
    pub fn generate() -> Result<Self> {
        const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
        let mut random = [0u8; 9];
        crypto::fill_random(&mut random)?;
        let suffix: String = random
            .iter()
            .map(|b| ALPHABET[usize::from(*b) % ALPHABET.len()] as char)
            .collect();
        Ok(Self(format!("key_{}_{}", Utc::now().timestamp_millis(), suffix)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for KeyId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for KeyId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Public key
// ---------------------------------------------------------------------------

/// An RSA-OAEP public key, SPKI DER encoded.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    der: Vec<u8>,
}

impl PublicKey {
    /// Import SPKI DER bytes. Fails with `InvalidKey` if they do not parse.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        asymmetric::parse_public(der)?;
        Ok(Self { der: der.to_vec() })
    }

    /// Import the base64 text form produced by [`PublicKey::to_base64`].
    pub fn from_base64(text: &str) -> Result<Self> {
        let der = encoding::from_base64(text, "publicKey")?;
        Self::from_der(&der)
    }

    pub fn as_der(&self) -> &[u8] {
        &self.der
    }

    pub fn to_base64(&self) -> String {
        encoding::to_base64(&self.der)
    }

    /// Modulus size in bits.
    pub fn bits(&self) -> Result<usize> {
        asymmetric::modulus_bits(&self.der)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("der_len", &self.der.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Private key
// ---------------------------------------------------------------------------

/// An RSA-OAEP private key, PKCS#8 DER encoded.
///
/// - Not `Clone`.
/// - Zeroised on drop.
/// - `Debug` never prints the key.
pub struct PrivateKey {
    der: Zeroizing<Vec<u8>>,
}

impl PrivateKey {
    pub(crate) fn from_der_unchecked(der: Zeroizing<Vec<u8>>) -> Self {
        Self { der }
    }

    /// Import PKCS#8 DER bytes. Fails with `InvalidKey` if they do not parse.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        asymmetric::parse_private(der)?;
        Ok(Self {
            der: Zeroizing::new(der.to_vec()),
        })
    }

    /// Import base64 text. Prefer persisting a wrapped key instead.
    pub fn from_base64(text: &str) -> Result<Self> {
        let der = Zeroizing::new(encoding::from_base64(text, "privateKey")?);
        Self::from_der(&der)
    }

    /// Borrow the DER bytes. Callers must not persist them unwrapped.
    pub fn as_der(&self) -> &[u8] {
        &self.der
    }

    /// Base64 text form, zeroised when dropped.
    pub fn to_base64(&self) -> Zeroizing<String> {
        Zeroizing::new(encoding::to_base64(&self.der))
    }

    /// Recompute the matching public key.
    pub fn public_key(&self) -> Result<PublicKey> {
        let der = asymmetric::public_from_private(&self.der)?;
        Ok(PublicKey { der })
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.der.as_slice().ct_eq(other.der.as_slice()).into()
    }
}

impl Eq for PrivateKey {}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey([REDACTED])")
    }
}

// ---------------------------------------------------------------------------
// Key pair
// ---------------------------------------------------------------------------

/// A freshly generated identity. The private half belongs to the owning
/// principal alone and should be wrapped before it is stored.
#[derive(Debug)]
pub struct KeyPair {
    pub public_key: PublicKey,
    pub private_key: PrivateKey,
    pub key_id: KeyId,
}

impl KeyPair {
    pub(crate) fn from_parts(public_der: Vec<u8>, private_der: Zeroizing<Vec<u8>>, key_id: KeyId) -> Self {
        Self {
            public_key: PublicKey { der: public_der },
            private_key: PrivateKey::from_der_unchecked(private_der),
            key_id,
        }
    }

    /// Split into the halves, consuming the pair.
    pub fn into_parts(self) -> (PublicKey, PrivateKey, KeyId) {
        (self.public_key, self.private_key, self.key_id)
    }
}

/// Reject the wrong-length unwrapped content key with the caller's error.
pub(crate) fn content_key_from(bytes: &[u8], err: ShareVaultError) -> Result<SymmetricKey> {
    SymmetricKey::from_slice(bytes).ok_or(err)
}
