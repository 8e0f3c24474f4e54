//! The file-sharing flows a host drives: create an identity, upload a file
//! for its owner or share it with another principal, download it again with
//! a password, delete the identity.
//!
//! `SecureShare` owns no key material between calls. It reads key records
//! from the injected [`KeyStore`] and records every operation, with its
//! outcome, in an [`ActivityLog`].

use tracing::info;

use crate::audit::{ActivityKind, ActivityLog, ActivityRecord, ActivitySink, ActivityStatus};
use crate::config::Config;
use crate::envelope::{DecryptedFile, EnvelopeCipher, SealedFile};
use crate::error::{Result, ShareVaultError};
use crate::keypair::{KeyPairService, PasswordPolicy};
use crate::keys::KeyId;
use crate::pending::PendingDecrypt;
use crate::store::{KeyExport, KeyStore, StoredKeyRecord};

/// A download waiting for its owner's password. Carries the metadata of the
/// file it was started for.
#[derive(Debug, Clone)]
pub struct PendingDownload {
    owner: String,
    name: String,
    mime_type: String,
    decrypt: PendingDecrypt,
}

impl PendingDownload {
    /// The principal whose password completes the download.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Name of the file being downloaded.
    pub fn file_name(&self) -> &str {
        &self.name
    }
}

/// Identity, upload, share, download and delete flows over a [`KeyStore`],
/// each recorded in an [`ActivityLog`].
pub struct SecureShare<S: KeyStore> {
    store: S,
    keys: KeyPairService,
    cipher: EnvelopeCipher,
    policy: PasswordPolicy,
    activity: ActivityLog,
}

impl<S: KeyStore> SecureShare<S> {
    /// Fails with `InvalidConfig` if `config` is out of bounds.
    pub fn new(store: S, config: Config) -> Result<Self> {
        Ok(Self {
            store,
            keys: KeyPairService::new(config.clone())?,
            cipher: EnvelopeCipher::new(config)?,
            policy: PasswordPolicy::default(),
            activity: ActivityLog::new(),
        })
    }

    /// The injected key store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Every operation recorded so far.
    pub fn activity_log(&self) -> &ActivityLog {
        &self.activity
    }

    /// Forward every later activity record to `sink` as well.
    pub fn add_activity_sink(&mut self, sink: Box<dyn ActivitySink>) {
        self.activity.add_sink(sink);
    }

    fn record(&mut self, kind: ActivityKind, subject: &str, owner: &str, ok: bool) {
        let status = if ok {
            ActivityStatus::Success
        } else {
            ActivityStatus::Failed
        };
        self.activity
            .append(ActivityRecord::now(kind, subject, owner, status));
    }

    fn record_for(&self, owner: &str) -> Result<StoredKeyRecord> {
        self.store
            .get(owner)?
            .ok_or_else(|| ShareVaultError::Storage(format!("no key pair for {owner}")))
    }

    /// Generate a key pair for `owner`, protect it with `password` and store
    /// it, replacing any previous record.
    pub fn create_identity(&mut self, owner: &str, password: &str, confirmation: &str) -> Result<KeyId> {
        self.policy.check_confirmed(password, confirmation)?;

        let result = self.keys.generate().and_then(|pair| {
            let wrapped = self.keys.wrap(&pair.private_key, password)?;
            self.store
                .put(owner, StoredKeyRecord::from_generated(&pair, &wrapped))?;
            Ok(pair.key_id)
        });

        let subject = result.as_ref().map(KeyId::to_string).unwrap_or_default();
        self.record(ActivityKind::KeyGenerated, &subject, owner, result.is_ok());
        if let Ok(key_id) = &result {
            info!(%key_id, owner, "identity created");
        }
        result
    }

    /// Encrypt a file for `owner`'s own public key.
    pub fn upload(&mut self, owner: &str, name: &str, mime_type: &str, bytes: &[u8]) -> Result<SealedFile> {
        let result = self.seal_for(owner, name, mime_type, bytes);
        self.record(ActivityKind::Upload, name, owner, result.is_ok());
        result
    }

    /// Encrypt a file from `sender` for `recipient`'s stored public key.
    ///
    /// Both principals need an identity. Only the recipient can open the
    /// result; the sender keeps no way back in.
    pub fn share(
        &mut self,
        sender: &str,
        recipient: &str,
        name: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<SealedFile> {
        let result = self
            .record_for(sender)
            .and_then(|_| self.seal_for(recipient, name, mime_type, bytes));
        self.record(ActivityKind::Share, name, sender, result.is_ok());
        if result.is_ok() {
            info!(sender, recipient, file = name, "file shared");
        }
        result
    }

    fn seal_for(&self, recipient: &str, name: &str, mime_type: &str, bytes: &[u8]) -> Result<SealedFile> {
        let record = self.record_for(recipient)?;
        let public_key = record.public_key()?;
        self.cipher
            .seal_file(name, mime_type, bytes, &public_key, Some(record.key_id))
    }

    /// Start a download. The returned handle needs the owner's password.
    ///
    /// Files sealed for a different key id fail here with `Decryption`,
    /// before the user is asked for anything.
    pub fn begin_download(&self, owner: &str, file: &SealedFile) -> Result<PendingDownload> {
        let record = self.record_for(owner)?;
        if let Some(recipient) = &file.envelope.recipient_key_id {
            if *recipient != record.key_id {
                return Err(ShareVaultError::Decryption);
            }
        }
        let wrapped = record.wrapped_private_key()?;
        Ok(PendingDownload {
            owner: owner.to_string(),
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            decrypt: self
                .keys
                .begin_decrypt(&self.cipher, file.envelope.clone(), wrapped),
        })
    }

    /// Complete a download started with [`begin_download`](Self::begin_download).
    ///
    /// A wrong password leaves `pending` usable for another attempt.
    pub fn finish_download(&mut self, pending: &PendingDownload, password: &str) -> Result<DecryptedFile> {
        let result = pending.decrypt.complete(password).map(|bytes| DecryptedFile {
            name: pending.name.clone(),
            mime_type: pending.mime_type.clone(),
            bytes,
        });
        self.record(ActivityKind::Download, &pending.name, &pending.owner, result.is_ok());
        result
    }

    /// `begin_download` and `finish_download` in one call.
    pub fn download(&mut self, owner: &str, file: &SealedFile, password: &str) -> Result<DecryptedFile> {
        match self.begin_download(owner, file) {
            Ok(pending) => self.finish_download(&pending, password),
            Err(e) => {
                self.record(ActivityKind::Download, &file.name, owner, false);
                Err(e)
            }
        }
    }

    /// Remove `owner`'s identity from the store. Files sealed for it can no
    /// longer be opened through this facade.
    pub fn delete_identity(&mut self, owner: &str) -> Result<KeyId> {
        let result = self.store.remove(owner).and_then(|removed| {
            removed
                .map(|record| record.key_id)
                .ok_or_else(|| ShareVaultError::Storage(format!("no key pair for {owner}")))
        });
        let subject = result.as_ref().map(KeyId::to_string).unwrap_or_default();
        self.record(ActivityKind::Delete, &subject, owner, result.is_ok());
        if let Ok(key_id) = &result {
            info!(%key_id, owner, "identity deleted");
        }
        result
    }

    /// Backup bundle of `owner`'s stored record.
    pub fn export_keys(&mut self, owner: &str) -> Result<KeyExport> {
        let result = self.record_for(owner).map(|record| record.export(owner));
        let subject = result
            .as_ref()
            .map(|e| e.record.key_id.to_string())
            .unwrap_or_default();
        self.record(ActivityKind::KeyExported, &subject, owner, result.is_ok());
        result
    }
}
