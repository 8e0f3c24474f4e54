//! Symmetric primitive and randomness.
//!
//! This module and `kdf` are the only places that import `ring` directly.
//! All other modules perform symmetric encryption and draw random bytes
//! exclusively through the functions exposed here.
//!
//! Primitive choices:
//! - **Cipher**: AES-256-GCM (authenticated encryption)
//! - **Nonce**: 96-bit (12 bytes), generated fresh per operation via `SystemRandom`
//! - **Key size**: 256 bits (32 bytes)
//!
//! Unlike a self-describing blob, the nonce is returned and accepted as a
//! separate field: stored envelopes keep `iv` next to the ciphertext.

use ring::aead::{self, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::{Result, ShareVaultError};

/// The AEAD algorithm used throughout sharevault.
const ALGORITHM: &aead::Algorithm = &AES_256_GCM;

/// Size of the nonce in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// Size of a symmetric key in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// Size of the GCM authentication tag appended to every ciphertext.
pub const TAG_LEN: usize = 16;

/// Fill `buf` from the system CSPRNG.
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    SystemRandom::new()
        .fill(buf)
        .map_err(|_| ShareVaultError::RandomnessFailure)
}

/// Generate a fresh random nonce. There is no nonce caching or
/// counter-based generation: every encryption draws a new one.
pub fn generate_nonce() -> Result<[u8; NONCE_LEN]> {
    let mut nonce = [0u8; NONCE_LEN];
    fill_random(&mut nonce)?;
    Ok(nonce)
}

/// Generate a cryptographically secure random 256-bit key.
pub fn generate_random_key() -> Result<[u8; KEY_LEN]> {
    let mut key = [0u8; KEY_LEN];
    fill_random(&mut key)?;
    Ok(key)
}

fn less_safe_key(key_bytes: &[u8; KEY_LEN]) -> Result<LessSafeKey> {
    let unbound = UnboundKey::new(ALGORITHM, key_bytes).map_err(|_| ShareVaultError::InvalidKey)?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt `plaintext` under `key_bytes` and `nonce` with AES-256-GCM.
///
/// # Layout of returned bytes
/// ```text
/// [ ciphertext (len = plaintext.len()) ][ GCM tag (16 bytes) ]
/// ```
pub fn seal(key_bytes: &[u8; KEY_LEN], nonce: [u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    let key = less_safe_key(key_bytes).map_err(|_| ShareVaultError::Encryption)?;

    let mut output = Vec::with_capacity(plaintext.len() + ALGORITHM.tag_len());
    output.extend_from_slice(plaintext);

    key.seal_in_place_append_tag(
        Nonce::assume_unique_for_key(nonce),
        aead::Aad::empty(),
        &mut output,
    )
    .map_err(|_| ShareVaultError::Encryption)?;

    Ok(output)
}

/// Decrypt AES-256-GCM output produced by [`seal`].
///
/// If the key or nonce is wrong, or the ciphertext has been tampered with,
/// the tag check fails and this returns `Decryption`. The caller receives
/// no partial plaintext. The plaintext is returned in the same buffer the
/// ciphertext was copied into, so no second copy of it is ever made.
pub fn open(key_bytes: &[u8; KEY_LEN], nonce: [u8; NONCE_LEN], ciphertext: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.len() < TAG_LEN {
        return Err(ShareVaultError::Decryption);
    }
    let key = less_safe_key(key_bytes).map_err(|_| ShareVaultError::Decryption)?;

    let mut buffer = ciphertext.to_vec();
    let plaintext_len = key
        .open_in_place(
            Nonce::assume_unique_for_key(nonce),
            aead::Aad::empty(),
            &mut buffer,
        )
        .map_err(|_| ShareVaultError::Decryption)?
        .len();
    buffer.truncate(plaintext_len);

    Ok(buffer)
}
