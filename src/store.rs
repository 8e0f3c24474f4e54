//! Persistence seam for key records.
//!
//! The core never assumes a storage medium. Hosts implement [`KeyStore`]
//! over whatever they have (browser storage, a database, a file) and every
//! context that needs to observe changes registers a [`StoreListener`].
//! [`InMemoryKeyStore`] is the reference implementation.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ShareVaultError};
use crate::keypair::{EncodedWrappedKey, WrappedPrivateKey};
use crate::keys::{KeyId, KeyPair, PublicKey};

/// What a principal persists about its identity: the public key in the
/// clear and the private key wrapped under its password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredKeyRecord {
    pub key_id: KeyId,
    pub public_key: String,
    #[serde(flatten)]
    pub wrapped: EncodedWrappedKey,
    pub created_at: DateTime<Utc>,
}

impl StoredKeyRecord {
    /// Build the record for a freshly generated pair and its wrapped key.
    pub fn from_generated(pair: &KeyPair, wrapped: &WrappedPrivateKey) -> Self {
        Self {
            key_id: pair.key_id.clone(),
            public_key: pair.public_key.to_base64(),
            wrapped: wrapped.to_encoded(),
            created_at: Utc::now(),
        }
    }

    /// Decode the stored public key.
    pub fn public_key(&self) -> Result<PublicKey> {
        PublicKey::from_base64(&self.public_key)
    }

    /// Decode the stored wrapped private key.
    pub fn wrapped_private_key(&self) -> Result<WrappedPrivateKey> {
        WrappedPrivateKey::from_encoded(&self.wrapped)
    }

    /// Backup bundle for download by its owner.
    pub fn export(&self, owner: &str) -> KeyExport {
        KeyExport {
            owner: owner.to_string(),
            record: self.clone(),
            exported_at: Utc::now(),
        }
    }
}

/// A [`StoredKeyRecord`] tagged with its owner and export time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyExport {
    pub owner: String,
    #[serde(flatten)]
    pub record: StoredKeyRecord,
    pub exported_at: DateTime<Utc>,
}

impl KeyExport {
    /// Pretty-printed JSON, as offered to the user for download.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ShareVaultError::Storage(e.to_string()))
    }

    /// Parse an export produced by [`KeyExport::to_json_pretty`].
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ShareVaultError::Storage(e.to_string()))
    }
}

/// A change observed in a [`KeyStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Put { owner: String, key_id: KeyId },
    Removed { owner: String, key_id: KeyId },
}

/// Receives every change made to the store it is subscribed to.
pub trait StoreListener: Send {
    /// Called after the change has been applied.
    fn notify(&mut self, event: StoreEvent);
}

/// Repository of key records, keyed by owner.
pub trait KeyStore: Send + Sync {
    /// The owner's record, if one is stored.
    fn get(&self, owner: &str) -> Result<Option<StoredKeyRecord>>;

    /// Insert or replace the owner's record.
    fn put(&self, owner: &str, record: StoredKeyRecord) -> Result<()>;

    /// Delete the owner's record, returning it if there was one.
    fn remove(&self, owner: &str) -> Result<Option<StoredKeyRecord>>;

    /// Register a listener for every later change.
    fn subscribe(&self, listener: Box<dyn StoreListener>) -> Result<()>;
}

/// Thread-safe in-memory [`KeyStore`].
#[derive(Default)]
pub struct InMemoryKeyStore {
    records: Mutex<HashMap<String, StoredKeyRecord>>,
    listeners: Mutex<Vec<Box<dyn StoreListener>>>,
}

impl std::fmt::Debug for InMemoryKeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryKeyStore")
            .field("records", &self.records.lock().map(|r| r.len()).ok())
            .field("listeners", &self.listeners.lock().map(|l| l.len()).ok())
            .finish()
    }
}

fn poisoned<T>(_: T) -> ShareVaultError {
    ShareVaultError::Storage("lock poisoned".into())
}

impl InMemoryKeyStore {
    /// An empty store with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Notify every listener with the lock released, so a listener may call
    /// back into the store. Changes a listener makes from inside `notify`
    /// are not delivered to the listeners of the outer call.
    fn broadcast(&self, event: StoreEvent) -> Result<()> {
        debug!(?event, "key store changed");
        let mut notifying = std::mem::take(&mut *self.listeners.lock().map_err(poisoned)?);
        for listener in notifying.iter_mut() {
            listener.notify(event.clone());
        }

        let mut listeners = self.listeners.lock().map_err(poisoned)?;
        let subscribed_meanwhile = std::mem::replace(&mut *listeners, notifying);
        listeners.extend(subscribed_meanwhile);
        Ok(())
    }
}

impl KeyStore for InMemoryKeyStore {
    fn get(&self, owner: &str) -> Result<Option<StoredKeyRecord>> {
        Ok(self.records.lock().map_err(poisoned)?.get(owner).cloned())
    }

    fn put(&self, owner: &str, record: StoredKeyRecord) -> Result<()> {
        let key_id = record.key_id.clone();
        self.records
            .lock()
            .map_err(poisoned)?
            .insert(owner.to_string(), record);
        self.broadcast(StoreEvent::Put {
            owner: owner.to_string(),
            key_id,
        })
    }

    fn remove(&self, owner: &str) -> Result<Option<StoredKeyRecord>> {
        let removed = self.records.lock().map_err(poisoned)?.remove(owner);
        if let Some(record) = &removed {
            self.broadcast(StoreEvent::Removed {
                owner: owner.to_string(),
                key_id: record.key_id.clone(),
            })?;
        }
        Ok(removed)
    }

    fn subscribe(&self, listener: Box<dyn StoreListener>) -> Result<()> {
        self.listeners.lock().map_err(poisoned)?.push(listener);
        Ok(())
    }
}
