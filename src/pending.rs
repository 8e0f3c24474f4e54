//! Two-phase decryption.
//!
//! A download needs the user's password partway through an otherwise
//! automatic operation. Instead of parking a callback somewhere global, the
//! caller starts the decrypt, gets back a [`PendingDecrypt`] handle that
//! holds no secrets, prompts for the password however it likes, and then
//! completes the handle.
//!
//! The handle survives a wrong password so the user can try again.
//! Dropping it (or calling `cancel`) abandons the operation; nothing
//! partial is ever produced.

use tracing::debug;

use crate::envelope::{EncryptedEnvelope, EnvelopeCipher};
use crate::error::Result;
use crate::keypair::{KeyPairService, WrappedPrivateKey};

/// A decrypt waiting for the password of the recipient's private key.
#[derive(Debug, Clone)]
pub struct PendingDecrypt {
    envelope: EncryptedEnvelope,
    wrapped_key: WrappedPrivateKey,
    keys: KeyPairService,
    cipher: EnvelopeCipher,
}

impl PendingDecrypt {
    pub(crate) fn new(
        envelope: EncryptedEnvelope,
        wrapped_key: WrappedPrivateKey,
        keys: KeyPairService,
        cipher: EnvelopeCipher,
    ) -> Self {
        Self {
            envelope,
            wrapped_key,
            keys,
            cipher,
        }
    }

    pub fn envelope(&self) -> &EncryptedEnvelope {
        &self.envelope
    }

    /// Unwrap the private key with `password` and decrypt.
    ///
    /// Fails with `InvalidPassword` (retry with another password) or
    /// `Decryption` (terminal: the envelope is not for this key, or is
    /// corrupted). The unwrapped private key is dropped before returning.
    pub fn complete(&self, password: &str) -> Result<Vec<u8>> {
        let private_key = self.keys.unwrap(&self.wrapped_key, password)?;
        self.cipher.decrypt(&self.envelope, &private_key)
    }

    /// Abandon the operation.
    pub fn cancel(self) {
        debug!("pending decrypt cancelled");
    }
}

impl KeyPairService {
    /// Start a two-phase decrypt of `envelope` with the wrapped private key
    /// of its recipient.
    pub fn begin_decrypt(
        &self,
        cipher: &EnvelopeCipher,
        envelope: EncryptedEnvelope,
        wrapped_key: WrappedPrivateKey,
    ) -> PendingDecrypt {
        PendingDecrypt::new(envelope, wrapped_key, self.clone(), cipher.clone())
    }
}
