//! Persistence adapter: typed access to the six persisted records over an
//! abstract key-value capability (spec §2 C6, §4.5, §6.2, §6.3).
//!
//! `KVStore` is the external collaborator (§1): the core never assumes
//! anything about the backend beyond get/set/delete/list_keys over byte
//! values. `PersistenceAdapter` is the only thing in this crate that knows
//! the six keys and two namespaces in §4.5's table.

use thiserror::Error;

use crate::credential::{Credential, VaultMetadata, WrappedDek};

#[derive(Debug, Error)]
#[error("{0}")]
pub struct StorageError(pub String);

/// The six persisted record keys/namespaces (spec §4.5). Part of the
/// on-disk contract: changing these breaks every vault written so far.
pub const KEY_ENCRYPTED_VAULT: &str = "encrypted-vault";
pub const KEY_VAULT_METADATA: &str = "vault-metadata";
pub const KEY_CREDENTIALS: &str = "passkey-credentials";
pub const KEY_WRAPPED_DEKS: &str = "wrapped-deks";
pub const FILE_BLOB_PREFIX: &str = "file-blobs:";

/// The key-value store capability (§6.2). No transactions, no ordering
/// guarantees across keys; durability is expected within one logical
/// instance. Values are opaque bytes — `PersistenceAdapter` owns the
/// string/JSON/raw distinction per key.
pub trait KVStore {
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<Vec<u8>>, StorageError>> + Send;

    fn set(
        &self,
        key: &str,
        value: Vec<u8>,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;

    fn delete(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;

    fn list_keys(
        &self,
        prefix: &str,
    ) -> impl std::future::Future<Output = Result<Vec<String>, StorageError>> + Send;
}

pub struct PersistenceAdapter<K> {
    store: K,
}

impl<K: KVStore> PersistenceAdapter<K> {
    pub fn new(store: K) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    /// True iff both the vault ciphertext and its metadata are present
    /// (§4.5). Write order at setup puts metadata last specifically so
    /// this check can't observe a half-written vault as existing.
    pub async fn vault_exists(&self) -> Result<bool, StorageError> {
        let vault = self.store.get(KEY_ENCRYPTED_VAULT).await?;
        let metadata = self.store.get(KEY_VAULT_METADATA).await?;
        Ok(vault.is_some() && metadata.is_some())
    }

    pub async fn load_encrypted_vault(&self) -> Result<Option<String>, StorageError> {
        load_string(&self.store, KEY_ENCRYPTED_VAULT).await
    }

    pub async fn save_encrypted_vault(&self, encoded: &str) -> Result<(), StorageError> {
        self.store
            .set(KEY_ENCRYPTED_VAULT, encoded.as_bytes().to_vec())
            .await
    }

    pub async fn load_metadata(&self) -> Result<Option<VaultMetadata>, StorageError> {
        load_json(&self.store, KEY_VAULT_METADATA).await
    }

    pub async fn save_metadata(&self, metadata: &VaultMetadata) -> Result<(), StorageError> {
        save_json(&self.store, KEY_VAULT_METADATA, metadata).await
    }

    pub async fn load_credentials(&self) -> Result<Vec<Credential>, StorageError> {
        Ok(load_json(&self.store, KEY_CREDENTIALS).await?.unwrap_or_default())
    }

    pub async fn save_credentials(&self, credentials: &[Credential]) -> Result<(), StorageError> {
        save_json(&self.store, KEY_CREDENTIALS, &credentials).await
    }

    pub async fn load_wrapped_deks(&self) -> Result<Vec<WrappedDek>, StorageError> {
        Ok(load_json(&self.store, KEY_WRAPPED_DEKS).await?.unwrap_or_default())
    }

    pub async fn save_wrapped_deks(&self, wrapped: &[WrappedDek]) -> Result<(), StorageError> {
        save_json(&self.store, KEY_WRAPPED_DEKS, &wrapped).await
    }

    pub async fn save_file_blob(&self, file_id: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        self.store.set(&file_blob_key(file_id), bytes).await
    }

    pub async fn load_file_blob(&self, file_id: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.store.get(&file_blob_key(file_id)).await
    }

    pub async fn delete_file_blob(&self, file_id: &str) -> Result<(), StorageError> {
        self.store.delete(&file_blob_key(file_id)).await
    }

    /// Deletes the four vault-namespace keys.
    pub async fn clear_all_vault_data(&self) -> Result<(), StorageError> {
        for key in [
            KEY_ENCRYPTED_VAULT,
            KEY_VAULT_METADATA,
            KEY_CREDENTIALS,
            KEY_WRAPPED_DEKS,
        ] {
            self.store.delete(key).await?;
        }
        Ok(())
    }

    /// Enumerates and deletes every `file-blobs:*` key.
    pub async fn clear_all_files(&self) -> Result<(), StorageError> {
        let keys = self.store.list_keys(FILE_BLOB_PREFIX).await?;
        for key in keys {
            self.store.delete(&key).await?;
        }
        Ok(())
    }
}

fn file_blob_key(file_id: &str) -> String {
    format!("{FILE_BLOB_PREFIX}{file_id}")
}

async fn load_string<K: KVStore>(store: &K, key: &str) -> Result<Option<String>, StorageError> {
    match store.get(key).await? {
        Some(bytes) => {
            let s = String::from_utf8(bytes)
                .map_err(|e| StorageError(format!("non-utf8 value for {key}: {e}")))?;
            Ok(Some(s))
        }
        None => Ok(None),
    }
}

async fn load_json<K: KVStore, T: serde::de::DeserializeOwned>(
    store: &K,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.get(key).await? {
        Some(bytes) => {
            let value = serde_json::from_slice(&bytes)
                .map_err(|e| StorageError(format!("malformed JSON for {key}: {e}")))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

async fn save_json<K: KVStore, T: serde::Serialize>(
    store: &K,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec(value)
        .map_err(|e| StorageError(format!("failed to serialise {key}: {e}")))?;
    store.set(key, bytes).await
}
