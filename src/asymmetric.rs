//! Asymmetric primitive: RSA with OAEP padding over SHA-256.
//!
//! This is the only module that imports `rsa`. Keys cross this module's
//! boundary as DER bytes (SPKI for public keys, PKCS#8 for private keys);
//! parsed `rsa` types never escape it.
//!
//! The keys are encryption-only. They wrap 32-byte content keys and nothing
//! else, so no signature scheme is exposed.

use rand::rngs::OsRng;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::sha2::Sha256;
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroizing;

use crate::error::{Result, ShareVaultError};

fn padding() -> Oaep {
    Oaep::new::<Sha256>()
}

/// Generate a key pair with the given modulus size and the standard public
/// exponent (65537). Returns `(spki_der, pkcs8_der)`.
pub fn generate(bits: usize) -> Result<(Vec<u8>, Zeroizing<Vec<u8>>)> {
    let private = RsaPrivateKey::new(&mut OsRng, bits).map_err(|_| ShareVaultError::KeyGeneration)?;
    let public = RsaPublicKey::from(&private);

    let public_der = public
        .to_public_key_der()
        .map_err(|_| ShareVaultError::KeyGeneration)?
        .as_bytes()
        .to_vec();
    let private_der = private
        .to_pkcs8_der()
        .map_err(|_| ShareVaultError::KeyGeneration)?;

    Ok((public_der, Zeroizing::new(private_der.as_bytes().to_vec())))
}

pub(crate) fn parse_public(der: &[u8]) -> Result<RsaPublicKey> {
    RsaPublicKey::from_public_key_der(der).map_err(|_| ShareVaultError::InvalidKey)
}

pub(crate) fn parse_private(der: &[u8]) -> Result<RsaPrivateKey> {
    let key = RsaPrivateKey::from_pkcs8_der(der).map_err(|_| ShareVaultError::InvalidKey)?;
    key.validate().map_err(|_| ShareVaultError::InvalidKey)?;
    Ok(key)
}

/// Derive the SPKI encoding of the public half of a PKCS#8 private key.
pub fn public_from_private(private_der: &[u8]) -> Result<Vec<u8>> {
    let private = parse_private(private_der)?;
    let der = RsaPublicKey::from(&private)
        .to_public_key_der()
        .map_err(|_| ShareVaultError::InvalidKey)?;
    Ok(der.as_bytes().to_vec())
}

/// Modulus size of an SPKI-encoded public key, in bits.
pub fn modulus_bits(public_der: &[u8]) -> Result<usize> {
    Ok(parse_public(public_der)?.size() * 8)
}

/// Encrypt `key` for the holder of `public_der`.
///
/// Any failure, including a public key that does not parse, is reported as
/// `Encryption`.
pub fn wrap_key(public_der: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    let public = parse_public(public_der).map_err(|_| ShareVaultError::Encryption)?;
    public
        .encrypt(&mut OsRng, padding(), key)
        .map_err(|_| ShareVaultError::Encryption)
}

/// Recover a key wrapped by [`wrap_key`].
///
/// A private key that does not match, a malformed private key and a
/// tampered wrapped key all produce the same `Decryption` error.
pub fn unwrap_key(private_der: &[u8], wrapped: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let private = parse_private(private_der).map_err(|_| ShareVaultError::Decryption)?;
    private
        .decrypt(padding(), wrapped)
        .map(Zeroizing::new)
        .map_err(|_| ShareVaultError::Decryption)
}
