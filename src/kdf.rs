//! Password-based key derivation.
//!
//! ```text
//! PBKDF2-HMAC-SHA256(
//!     password   = UTF-8 bytes of the user's password,
//!     salt       = 16 random bytes, fresh per wrap,
//!     iterations = Config::kdf_iterations (>= 100,000),
//! ) -> 256-bit AES key
//! ```
//!
//! The iteration count is deliberately expensive (hundreds of milliseconds
//! in an optimised build). Latency-sensitive hosts should call into this
//! off their request or UI thread.

use std::num::NonZeroU32;

use ring::pbkdf2;
use zeroize::Zeroize;

use crate::config::{MAX_KDF_ITERATIONS, MIN_KDF_ITERATIONS};
use crate::crypto::{self, KEY_LEN};
use crate::error::{Result, ShareVaultError};
use crate::keys::SymmetricKey;

/// Size of the PBKDF2 salt in bytes.
pub const SALT_LEN: usize = 16;

/// Generate a fresh random salt.
pub fn generate_salt() -> Result<[u8; SALT_LEN]> {
    let mut salt = [0u8; SALT_LEN];
    crypto::fill_random(&mut salt)?;
    Ok(salt)
}

/// Derive a 256-bit key from `password` and `salt`.
///
/// Iteration counts outside `MIN_KDF_ITERATIONS..=MAX_KDF_ITERATIONS` are
/// refused even if a caller bypassed `Config::validate`. Counts read back
/// from stored records are not authenticated.
pub fn derive_key(password: &str, salt: &[u8; SALT_LEN], iterations: u32) -> Result<SymmetricKey> {
    if iterations < MIN_KDF_ITERATIONS {
        return Err(ShareVaultError::InvalidConfig(format!(
            "kdf iterations below {MIN_KDF_ITERATIONS}"
        )));
    }
    if iterations > MAX_KDF_ITERATIONS {
        return Err(ShareVaultError::InvalidConfig(format!(
            "kdf iterations above {MAX_KDF_ITERATIONS}"
        )));
    }
    let iterations = NonZeroU32::new(iterations)
        .ok_or_else(|| ShareVaultError::InvalidConfig("kdf iterations must be non-zero".into()))?;

    let mut derived = [0u8; KEY_LEN];
    pbkdf2::derive(pbkdf2::PBKDF2_HMAC_SHA256, iterations, salt, password.as_bytes(), &mut derived);

    let key = SymmetricKey::from_bytes(derived);
    derived.zeroize();
    Ok(key)
}
