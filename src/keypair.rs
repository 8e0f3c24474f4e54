//! Key-pair generation and password protection of private keys.
//!
//! ```text
//! wrap:   salt  <- 16 random bytes
//!         kek   <- PBKDF2-HMAC-SHA256(password, salt, iterations)
//!         iv    <- 12 random bytes
//!         ct    <- AES-256-GCM(kek, iv, pkcs8_der)
//! unwrap: the reverse, failing on any tag mismatch
//! ```
//!
//! A wrapped private key is the only form in which a private key may be
//! persisted. Wrong password and corrupted ciphertext are reported as the
//! same `InvalidPassword` error so that neither becomes an oracle.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::asymmetric;
use crate::config::{Config, MIN_KDF_ITERATIONS};
use crate::crypto::{self, NONCE_LEN};
use crate::encoding;
use crate::error::{Result, ShareVaultError};
use crate::kdf::{self, SALT_LEN};
use crate::keys::{KeyId, KeyPair, PrivateKey};

/// A private key encrypted under a password-derived key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedPrivateKey {
    /// AES-256-GCM ciphertext of the PKCS#8 DER, tag appended.
    pub ciphertext: Vec<u8>,
    pub salt: [u8; SALT_LEN],
    pub iv: [u8; NONCE_LEN],
    /// PBKDF2 iteration count used at wrap time.
    pub iterations: u32,
}

/// Text form of a [`WrappedPrivateKey`], every byte field base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedWrappedKey {
    pub encrypted_private_key: String,
    pub salt: String,
    pub iv: String,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
}

fn default_iterations() -> u32 {
    MIN_KDF_ITERATIONS
}

impl WrappedPrivateKey {
    pub fn to_encoded(&self) -> EncodedWrappedKey {
        EncodedWrappedKey {
            encrypted_private_key: encoding::to_base64(&self.ciphertext),
            salt: encoding::to_base64(&self.salt),
            iv: encoding::to_base64(&self.iv),
            iterations: self.iterations,
        }
    }

    pub fn from_encoded(encoded: &EncodedWrappedKey) -> Result<Self> {
        Ok(Self {
            ciphertext: encoding::from_base64(&encoded.encrypted_private_key, "encryptedPrivateKey")?,
            salt: encoding::from_base64_array(&encoded.salt, "salt")?,
            iv: encoding::from_base64_array(&encoded.iv, "iv")?,
            iterations: encoded.iterations,
        })
    }
}

/// Caller-side password rules. The service itself never enforces them;
/// hosts run `check` before calling [`KeyPairService::wrap`].
#[derive(Debug, Clone, Copy)]
pub struct PasswordPolicy {
    pub min_chars: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self { min_chars: 8 }
    }
}

impl PasswordPolicy {
    pub fn check(&self, password: &str) -> Result<()> {
        if password.chars().count() < self.min_chars {
            return Err(ShareVaultError::WeakPassword("password is too short"));
        }
        Ok(())
    }

    /// `check`, plus the confirmation field must match.
    pub fn check_confirmed(&self, password: &str, confirmation: &str) -> Result<()> {
        if password != confirmation {
            return Err(ShareVaultError::WeakPassword("passwords do not match"));
        }
        self.check(password)
    }
}

/// Produces and protects the asymmetric identity used for file sharing.
///
/// Stateless apart from its configuration; `Send + Sync` and safe to share
/// between any number of callers.
#[derive(Debug, Clone, Default)]
pub struct KeyPairService {
    config: Config,
}

impl KeyPairService {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Generate a fresh RSA-OAEP key pair at the configured strength.
    pub fn generate(&self) -> Result<KeyPair> {
        let (public_der, private_der) = asymmetric::generate(self.config.rsa_bits)?;
        let key_id = KeyId::generate().map_err(|_| ShareVaultError::KeyGeneration)?;
        debug!(%key_id, bits = self.config.rsa_bits, "generated key pair");
        Ok(KeyPair::from_parts(public_der, private_der, key_id))
    }

    /// Encrypt `private_key` under a key derived from `password`.
    pub fn wrap(&self, private_key: &PrivateKey, password: &str) -> Result<WrappedPrivateKey> {
        let salt = kdf::generate_salt()?;
        let iv = crypto::generate_nonce()?;
        let kek = kdf::derive_key(password, &salt, self.config.kdf_iterations)?;

        let ciphertext = crypto::seal(kek.as_bytes(), iv, private_key.as_der())?;
        debug!(
            ciphertext_len = ciphertext.len(),
            iterations = self.config.kdf_iterations,
            "wrapped private key"
        );

        Ok(WrappedPrivateKey {
            ciphertext,
            salt,
            iv,
            iterations: self.config.kdf_iterations,
        })
    }

    /// Recover the private key. Every failure is `InvalidPassword`.
    pub fn unwrap(&self, wrapped: &WrappedPrivateKey, password: &str) -> Result<PrivateKey> {
        let result = Self::try_unwrap(wrapped, password);
        if result.is_err() {
            warn!("private key unwrap failed");
        }
        result.map_err(|_| ShareVaultError::InvalidPassword)
    }

    fn try_unwrap(wrapped: &WrappedPrivateKey, password: &str) -> Result<PrivateKey> {
        let kek = kdf::derive_key(password, &wrapped.salt, wrapped.iterations)?;
        let der = Zeroizing::new(crypto::open(kek.as_bytes(), wrapped.iv, &wrapped.ciphertext)?);
        PrivateKey::from_der(&der)
    }

    /// Re-protect a wrapped key under a new password, with a fresh salt and
    /// nonce and the service's current iteration count.
    pub fn change_password(
        &self,
        wrapped: &WrappedPrivateKey,
        old_password: &str,
        new_password: &str,
    ) -> Result<WrappedPrivateKey> {
        let private_key = self.unwrap(wrapped, old_password)?;
        self.wrap(&private_key, new_password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    fn private_a() -> PrivateKey {
        PrivateKey::from_der(testutil::rsa_pair_a().1).unwrap()
    }

    #[test]
    fn test_wrap_unwrap_roundtrip() {
        let service = KeyPairService::default();
        let wrapped = service.wrap(&private_a(), "Str0ngPass!").unwrap();
        assert_eq!(wrapped.iterations, MIN_KDF_ITERATIONS);
        let recovered = service.unwrap(&wrapped, "Str0ngPass!").unwrap();
        assert_eq!(recovered, private_a());
    }

    #[test]
    fn test_wrong_password_is_invalid_password() {
        let service = KeyPairService::default();
        let wrapped = service.wrap(&private_a(), "Str0ngPass!").unwrap();
        assert!(matches!(
            service.unwrap(&wrapped, "wrong"),
            Err(ShareVaultError::InvalidPassword)
        ));
    }

    #[test]
    fn test_corruption_is_invalid_password() {
        let service = KeyPairService::default();
        let mut wrapped = service.wrap(&private_a(), "Str0ngPass!").unwrap();
        wrapped.ciphertext[10] ^= 0x01;
        assert!(matches!(
            service.unwrap(&wrapped, "Str0ngPass!"),
            Err(ShareVaultError::InvalidPassword)
        ));

        let mut lowered = service.wrap(&private_a(), "Str0ngPass!").unwrap();
        lowered.iterations = 10;
        assert!(matches!(
            service.unwrap(&lowered, "Str0ngPass!"),
            Err(ShareVaultError::InvalidPassword)
        ));
    }

    #[test]
    fn test_inflated_iteration_count_fails_fast() {
        let service = KeyPairService::default();
        let wrapped = service.wrap(&private_a(), "Str0ngPass!").unwrap();
        let mut encoded = wrapped.to_encoded();
        encoded.iterations = u32::MAX;

        let inflated = WrappedPrivateKey::from_encoded(&encoded).unwrap();
        let started = std::time::Instant::now();
        assert!(matches!(
            service.unwrap(&inflated, "Str0ngPass!"),
            Err(ShareVaultError::InvalidPassword)
        ));
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
    }

    #[test]
    fn test_fresh_salt_and_iv_per_wrap() {
        let service = KeyPairService::default();
        let a = service.wrap(&private_a(), "Str0ngPass!").unwrap();
        let b = service.wrap(&private_a(), "Str0ngPass!").unwrap();
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_change_password() {
        let service = KeyPairService::default();
        let wrapped = service.wrap(&private_a(), "Str0ngPass!").unwrap();
        let rewrapped = service
            .change_password(&wrapped, "Str0ngPass!", "An0therPass!")
            .unwrap();
        assert!(service.unwrap(&rewrapped, "Str0ngPass!").is_err());
        assert_eq!(service.unwrap(&rewrapped, "An0therPass!").unwrap(), private_a());
    }

    #[test]
    fn test_encoded_form_defaults_iterations() {
        let service = KeyPairService::default();
        let wrapped = service.wrap(&private_a(), "Str0ngPass!").unwrap();
        let mut json = serde_json::to_value(wrapped.to_encoded()).unwrap();
        json.as_object_mut().unwrap().remove("iterations");

        let encoded: EncodedWrappedKey = serde_json::from_value(json).unwrap();
        let decoded = WrappedPrivateKey::from_encoded(&encoded).unwrap();
        assert_eq!(decoded, wrapped);
    }

    #[test]
    fn test_password_policy() {
        let policy = PasswordPolicy::default();
        assert!(policy.check("short").is_err());
        assert!(policy.check("Str0ngPass!").is_ok());
        assert!(policy.check_confirmed("Str0ngPass!", "Str0ngPass?").is_err());
        assert!(policy.check_confirmed("Str0ngPass!", "Str0ngPass!").is_ok());
    }
}
