//! The vault state machine and public API (spec §2 C8, §4.7).
//!
//! `VaultService` owns the in-memory DEK and decrypted `VaultDocument`
//! exclusively; every other component receives keys/bytes by borrow or
//! move per call and holds no long-lived reference (spec §3 "Ownership").
//! One instance per vault, no process-wide globals (spec §9).

use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use crate::aead;
use crate::authenticator::AuthenticatorClient;
use crate::credential::{Credential, VaultMetadata, WrappedDek};
use crate::envelope;
use crate::error::VaultError;
use crate::file_crypto::{self, FileCryptoError, FileMetadata};
use crate::items::{VaultDocument, VaultItem, VaultItemType};
use crate::kdf::{self, AeadKey};
use crate::schema;
use crate::storage::{KVStore, PersistenceAdapter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultState {
    Uninitialised,
    Locked,
    Unlocked,
}

pub struct NewPasswordItem {
    pub title: String,
    pub content: String,
    pub url: Option<String>,
    pub username: Option<String>,
}

pub struct NewNoteItem {
    pub title: String,
    pub content: String,
}

pub struct NewSecretItem {
    pub title: String,
    pub content: String,
}

pub struct ItemUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
    pub username: Option<String>,
}

struct UnlockedState {
    dek: AeadKey,
    document: VaultDocument,
}

/// One vault instance: state machine + orchestration of C2–C7 and the
/// authenticator capability (spec §4.7).
pub struct VaultService<K, A> {
    storage: PersistenceAdapter<K>,
    authenticator: A,
    state: VaultState,
    credentials: Vec<Credential>,
    metadata: Option<VaultMetadata>,
    unlocked: Option<UnlockedState>,
}

impl<K: KVStore, A: AuthenticatorClient> VaultService<K, A> {
    pub fn new(store: K, authenticator: A) -> Self {
        Self {
            storage: PersistenceAdapter::new(store),
            authenticator,
            state: VaultState::Uninitialised,
            credentials: Vec::new(),
            metadata: None,
            unlocked: None,
        }
    }

    pub fn state(&self) -> VaultState {
        self.state
    }

    /// Plain synchronous getters over already-loaded state (spec §9):
    /// credential metadata is available whether locked or unlocked.
    pub fn credentials(&self) -> &[Credential] {
        &self.credentials
    }

    pub fn metadata(&self) -> Option<&VaultMetadata> {
        self.metadata.as_ref()
    }

    pub fn items(&self) -> Option<&[VaultItem]> {
        self.unlocked.as_ref().map(|u| u.document.items.as_slice())
    }

    /// Inspect storage and set the initial state. Never touches the
    /// authenticator.
    pub async fn initialize(&mut self) -> Result<VaultState, VaultError> {
        self.credentials = self.storage.load_credentials().await?;
        self.metadata = self.storage.load_metadata().await?;

        self.state = if self.storage.vault_exists().await? {
            VaultState::Locked
        } else {
            VaultState::Uninitialised
        };
        Ok(self.state)
    }

    /// Legal only from `Uninitialised`. Enrolls the first credential,
    /// generates the DEK, and persists everything in the write order
    /// `credentials, wrapped-deks, encrypted-vault, metadata` (spec §4.7
    /// "Atomicity" — metadata last so `vault_exists()` is true only once
    /// every component is present).
    pub async fn setup(
        &mut self,
        user_name: &str,
        passkey_name: &str,
    ) -> Result<(), VaultError> {
        if self.state != VaultState::Uninitialised {
            return Err(VaultError::AlreadyInitialised);
        }

        let (credential, prf_output) = self
            .authenticator
            .create_credential(user_name, passkey_name)
            .await?;

        let kek = kdf::derive_kek(&prf_output, &credential.prf_salt)
            .map_err(|_| VaultError::DecryptionFailed)?;
        let dek = envelope::generate_dek();
        let wrapped_key = envelope::wrap(&dek, &kek)?;

        let now = now_unix();
        let wrapped_dek = WrappedDek {
            credential_id: credential.id.clone(),
            wrapped_key,
            created_at: now,
            prf_salt: credential.prf_salt.clone(),
        };

        let document = VaultDocument::default();
        let encrypted = aead::encrypt_json(&dek, &document, &[])?;

        let metadata = VaultMetadata {
            version: document.version,
            created_at: now,
            modified_at: now,
            item_count: document.items.len(),
        };

        self.storage
            .save_credentials(std::slice::from_ref(&credential))
            .await?;
        self.storage.save_wrapped_deks(&[wrapped_dek]).await?;
        self.storage.save_encrypted_vault(&encrypted).await?;
        self.storage.save_metadata(&metadata).await?;

        self.credentials = vec![credential];
        self.metadata = Some(metadata);
        self.unlocked = Some(UnlockedState { dek, document });
        self.state = VaultState::Unlocked;
        Ok(())
    }

    /// Legal from `Locked`. Authenticates with any stored credential,
    /// derives its KEK, unwraps the DEK, decrypts and validates the
    /// document, and publishes the unlocked state.
    pub async fn unlock(&mut self) -> Result<(), VaultError> {
        if self.state != VaultState::Locked {
            return Err(VaultError::NotInitialised);
        }
        if self.credentials.is_empty() {
            return Err(VaultError::NoCredentials);
        }

        let (credential_id, prf_output) =
            self.authenticator.authenticate_any(&self.credentials).await?;

        let credential = self
            .credentials
            .iter()
            .find(|c| c.id == credential_id)
            .cloned()
            .ok_or_else(|| VaultError::VaultCorrupted {
                reason: "authenticated credential is not enrolled".to_string(),
            })?;

        let wrapped_deks = self.storage.load_wrapped_deks().await?;
        let wrapped = wrapped_deks
            .iter()
            .find(|w| w.credential_id == credential.id)
            .ok_or_else(|| VaultError::VaultCorrupted {
                reason: "no wrapped DEK for the authenticated credential".to_string(),
            })?;

        let kek = kdf::derive_kek(&prf_output, &credential.prf_salt)
            .map_err(|_| VaultError::DecryptionFailed)?;
        let dek = envelope::unwrap(&wrapped.wrapped_key, &kek)?;

        let encrypted = self
            .storage
            .load_encrypted_vault()
            .await?
            .ok_or_else(|| VaultError::VaultCorrupted {
                reason: "encrypted vault record is missing".to_string(),
            })?;

        let raw: serde_json::Value = aead::decrypt_json(&dek, &encrypted, &[])?;
        schema::validate_vault_document(&raw).map_err(|e| VaultError::VaultCorrupted {
            reason: e.0,
        })?;
        let document: VaultDocument =
            serde_json::from_value(raw).map_err(|e| VaultError::VaultCorrupted {
                reason: e.to_string(),
            })?;

        if let Some(stored) = self.credentials.iter_mut().find(|c| c.id == credential_id) {
            stored.last_used_at = now_unix();
            self.storage.save_credentials(&self.credentials).await?;
        }

        self.unlocked = Some(UnlockedState { dek, document });
        self.state = VaultState::Unlocked;
        Ok(())
    }

    /// Drops the in-memory DEK and document. Credentials and metadata
    /// remain available for display. Idempotent.
    pub fn lock(&mut self) {
        // `AeadKey`/`VaultDocument` drop here; secret bytes are backed by
        // `secrecy::SecretSlice`, which zeroizes on drop.
        self.unlocked = None;
        if self.state == VaultState::Unlocked {
            self.state = VaultState::Locked;
        }
    }

    /// Legal only from `Unlocked`. Wraps the current in-memory DEK under a
    /// freshly enrolled credential; does not generate a new DEK.
    pub async fn add_passkey(&mut self, passkey_name: &str) -> Result<(), VaultError> {
        let unlocked = self.require_unlocked()?;

        let (credential, prf_output) = self
            .authenticator
            .create_credential("", passkey_name)
            .await?;

        let kek = kdf::derive_kek(&prf_output, &credential.prf_salt)
            .map_err(|_| VaultError::DecryptionFailed)?;
        let wrapped_key = envelope::wrap(&unlocked.dek, &kek)?;

        let wrapped_dek = WrappedDek {
            credential_id: credential.id.clone(),
            wrapped_key,
            created_at: now_unix(),
            prf_salt: credential.prf_salt.clone(),
        };

        let mut wrapped_deks = self.storage.load_wrapped_deks().await?;
        wrapped_deks.push(wrapped_dek);

        let mut credentials = self.credentials.clone();
        credentials.push(credential);

        self.storage.save_credentials(&credentials).await?;
        self.storage.save_wrapped_deks(&wrapped_deks).await?;

        self.credentials = credentials;
        Ok(())
    }

    /// Legal regardless of unlock state. Refuses to drop below one
    /// credential, and refuses an unknown id. The in-memory DEK, if any,
    /// is unaffected.
    pub async fn remove_passkey(&mut self, credential_id: &str) -> Result<(), VaultError> {
        if self.credentials.len() <= 1 {
            return Err(VaultError::LastPasskey);
        }
        if !self.credentials.iter().any(|c| c.id == credential_id) {
            return Err(VaultError::PasskeyNotFound(credential_id.to_string()));
        }

        let credentials: Vec<Credential> = self
            .credentials
            .iter()
            .filter(|c| c.id != credential_id)
            .cloned()
            .collect();

        let wrapped_deks: Vec<WrappedDek> = self
            .storage
            .load_wrapped_deks()
            .await?
            .into_iter()
            .filter(|w| w.credential_id != credential_id)
            .collect();

        self.storage.save_credentials(&credentials).await?;
        self.storage.save_wrapped_deks(&wrapped_deks).await?;
        self.credentials = credentials;
        Ok(())
    }

    /// Rename a stored credential's display name. Touches neither the DEK
    /// nor any wrapped key.
    pub async fn rename_passkey(
        &mut self,
        credential_id: &str,
        new_name: &str,
    ) -> Result<(), VaultError> {
        let credential = self
            .credentials
            .iter_mut()
            .find(|c| c.id == credential_id)
            .ok_or_else(|| VaultError::PasskeyNotFound(credential_id.to_string()))?;
        credential.name = new_name.to_string();

        self.storage.save_credentials(&self.credentials).await?;
        Ok(())
    }

    pub async fn add_vault_item(&mut self, item: AddItemKind) -> Result<Uuid, VaultError> {
        self.require_unlocked()?;
        let now = now_unix();
        let id = Uuid::new_v4();

        let item = match item {
            AddItemKind::Password(p) => VaultItem {
                id,
                item_type: VaultItemType::Password,
                title: p.title,
                content: p.content,
                url: p.url,
                username: p.username,
                file_id: None,
                file_name: None,
                file_size: None,
                mime_type: None,
                created_at: now,
                modified_at: now,
            },
            AddItemKind::Note(n) => VaultItem {
                id,
                item_type: VaultItemType::Note,
                title: n.title,
                content: n.content,
                url: None,
                username: None,
                file_id: None,
                file_name: None,
                file_size: None,
                mime_type: None,
                created_at: now,
                modified_at: now,
            },
            AddItemKind::Secret(s) => VaultItem {
                id,
                item_type: VaultItemType::Secret,
                title: s.title,
                content: s.content,
                url: None,
                username: None,
                file_id: None,
                file_name: None,
                file_size: None,
                mime_type: None,
                created_at: now,
                modified_at: now,
            },
        };

        self.unlocked
            .as_mut()
            .expect("checked above")
            .document
            .items
            .push(item);
        self.save_vault_data().await?;
        Ok(id)
    }

    pub async fn update_vault_item(&mut self, id: Uuid, update: ItemUpdate) -> Result<(), VaultError> {
        self.require_unlocked()?;
        let now = now_unix();

        let document = &mut self.unlocked.as_mut().expect("checked above").document;
        let item = document
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| VaultError::ItemNotFound(id.to_string()))?;

        if let Some(title) = update.title {
            item.title = title;
        }
        if let Some(content) = update.content {
            item.content = content;
        }
        if let Some(url) = update.url {
            item.url = Some(url);
        }
        if let Some(username) = update.username {
            item.username = Some(username);
        }
        item.modified_at = now;

        self.save_vault_data().await?;
        Ok(())
    }

    /// File items additionally delete their associated file-blob.
    pub async fn delete_vault_item(&mut self, id: Uuid) -> Result<(), VaultError> {
        self.require_unlocked()?;

        let document = &mut self.unlocked.as_mut().expect("checked above").document;
        let position = document
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| VaultError::ItemNotFound(id.to_string()))?;
        let removed = document.items.remove(position);

        if let Some(file_id) = removed.file_id {
            self.storage.delete_file_blob(&file_id.to_string()).await?;
        }

        self.save_vault_data().await?;
        Ok(())
    }

    /// Legal from `Unlocked`. Size-gates, allocates a fresh `fileId`,
    /// encrypts the bytes, writes the blob, and appends a `file`-typed
    /// item.
    pub async fn add_file_item(
        &mut self,
        bytes: &[u8],
        title: &str,
        file_name: &str,
        mime_type: &str,
    ) -> Result<Uuid, VaultError> {
        let unlocked = self.require_unlocked()?;

        let encrypted = file_crypto::encrypt_file(&unlocked.dek, bytes, file_name, mime_type)
            .map_err(file_crypto_to_vault_error)?;

        let file_id = Uuid::new_v4();
        self.storage
            .save_file_blob(&file_id.to_string(), encrypted.ciphertext)
            .await?;

        let now = now_unix();
        let id = Uuid::new_v4();
        let item = VaultItem {
            id,
            item_type: VaultItemType::File,
            title: title.to_string(),
            content: String::new(),
            url: None,
            username: None,
            file_id: Some(file_id),
            file_name: Some(encrypted.metadata.file_name.clone()),
            file_size: Some(encrypted.metadata.original_size),
            mime_type: Some(encrypted.metadata.mime_type.clone()),
            created_at: now,
            modified_at: now,
        };

        self.unlocked
            .as_mut()
            .expect("checked above")
            .document
            .items
            .push(item);
        self.save_vault_data().await?;
        Ok(id)
    }

    /// Load, decrypt, and return a file item's plaintext bytes plus
    /// filename/MIME. Saving the bytes to disk is the caller's concern
    /// (spec §1).
    pub async fn get_decrypted_file(&self, id: Uuid) -> Result<DecryptedFileResult, VaultError> {
        let unlocked = self.unlocked.as_ref().ok_or(VaultError::VaultLocked)?;

        let item = unlocked
            .document
            .items
            .iter()
            .find(|i| i.id == id)
            .ok_or_else(|| VaultError::ItemNotFound(id.to_string()))?;

        if item.item_type != VaultItemType::File {
            return Err(VaultError::ItemNotAFile);
        }
        let file_id = item.file_id.ok_or(VaultError::ItemNotAFile)?;

        let ciphertext = self
            .storage
            .load_file_blob(&file_id.to_string())
            .await?
            .ok_or_else(|| VaultError::ItemNotFound(file_id.to_string()))?;

        let metadata = FileMetadata {
            file_name: item.file_name.clone().unwrap_or_default(),
            mime_type: item.mime_type.clone().unwrap_or_default(),
            original_size: item.file_size.unwrap_or(ciphertext.len()),
            version: 1,
        };

        let decrypted = file_crypto::decrypt_file(&unlocked.dek, &ciphertext, &metadata)
            .map_err(file_crypto_to_vault_error)?;

        Ok(DecryptedFileResult {
            bytes: decrypted.bytes,
            file_name: decrypted.file_name,
            mime_type: decrypted.mime_type,
        })
    }

    /// Case-insensitive substring search over title/content/url/username/
    /// filename. In-memory only.
    pub fn search(&self, query: &str) -> Vec<&VaultItem> {
        let Some(unlocked) = self.unlocked.as_ref() else {
            return Vec::new();
        };
        let query_lower = query.to_lowercase();
        unlocked
            .document
            .items
            .iter()
            .filter(|item| item.matches(&query_lower))
            .collect()
    }

    /// Legal only from `Unlocked` (an intentional guard against accidental
    /// destruction). Wipes both namespaces and returns to `Uninitialised`.
    pub async fn reset(&mut self) -> Result<(), VaultError> {
        self.require_unlocked()?;

        self.storage.clear_all_files().await?;
        self.storage.clear_all_vault_data().await?;

        self.unlocked = None;
        self.credentials.clear();
        self.metadata = None;
        self.state = VaultState::Uninitialised;
        Ok(())
    }

    fn require_unlocked(&self) -> Result<&UnlockedState, VaultError> {
        self.unlocked.as_ref().ok_or(VaultError::VaultLocked)
    }

    /// Re-encrypt the whole document with the DEK, write the ciphertext,
    /// and update `modifiedAt`/`itemCount` in metadata (spec §4.7).
    async fn save_vault_data(&mut self) -> Result<(), VaultError> {
        let unlocked = self.unlocked.as_ref().ok_or(VaultError::VaultLocked)?;
        let encrypted = aead::encrypt_json(&unlocked.dek, &unlocked.document, &[])?;
        self.storage.save_encrypted_vault(&encrypted).await?;

        let now = now_unix();
        let metadata = VaultMetadata {
            version: unlocked.document.version,
            created_at: self.metadata.map(|m| m.created_at).unwrap_or(now),
            modified_at: now,
            item_count: unlocked.document.items.len(),
        };
        self.storage.save_metadata(&metadata).await?;
        self.metadata = Some(metadata);
        Ok(())
    }
}

pub enum AddItemKind {
    Password(NewPasswordItem),
    Note(NewNoteItem),
    Secret(NewSecretItem),
}

pub struct DecryptedFileResult {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}

fn file_crypto_to_vault_error(err: FileCryptoError) -> VaultError {
    match err {
        FileCryptoError::FileTooLarge => VaultError::FileTooLarge,
        FileCryptoError::Aead(_) => VaultError::DecryptionFailed,
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
