//! End-to-end scenarios against `VaultService` over the in-memory support
//! backends, one per numbered behaviour this crate commits to.

use serde_json::json;

use passkey_vault::authenticator::AuthenticatorClient;
use passkey_vault::service::{AddItemKind, NewNoteItem, NewPasswordItem, VaultService, VaultState};
use passkey_vault::storage::{KVStore, PersistenceAdapter, KEY_ENCRYPTED_VAULT};
use passkey_vault::support::{FakeAuthenticator, MemoryStore};
use passkey_vault::{aead, bytes, envelope, kdf, VaultError};

/// Returns the service plus the store/authenticator handles it shares
/// state with, so tests can script authenticator behaviour or tamper with
/// raw storage from outside the service.
fn service() -> (VaultService<MemoryStore, FakeAuthenticator>, MemoryStore, FakeAuthenticator) {
    let store = MemoryStore::new();
    let authenticator = FakeAuthenticator::new();
    let service = VaultService::new(store.clone(), authenticator.clone());
    (service, store, authenticator)
}

#[tokio::test]
async fn setup_add_item_lock_unlock_recovers_the_item() {
    let (mut service, _store, _auth) = service();
    assert_eq!(service.initialize().await.unwrap(), VaultState::Uninitialised);

    service.setup("alice", "phone").await.unwrap();
    assert_eq!(service.state(), VaultState::Unlocked);

    let id = service
        .add_vault_item(AddItemKind::Password(NewPasswordItem {
            title: "github".to_string(),
            content: "hunter2".to_string(),
            url: Some("https://github.com".to_string()),
            username: Some("alice".to_string()),
        }))
        .await
        .unwrap();

    service.lock();
    assert_eq!(service.state(), VaultState::Locked);
    assert!(service.items().is_none());

    service.unlock().await.unwrap();
    assert_eq!(service.state(), VaultState::Unlocked);

    let items = service.items().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, id);
    assert_eq!(items[0].content, "hunter2");
}

#[tokio::test]
async fn either_of_two_enrolled_passkeys_unlocks_the_same_vault() {
    let (mut service, _store, auth) = service();
    service.initialize().await.unwrap();
    service.setup("alice", "phone").await.unwrap();

    service
        .add_vault_item(AddItemKind::Note(NewNoteItem {
            title: "recovery codes".to_string(),
            content: "1234-5678".to_string(),
        }))
        .await
        .unwrap();

    service.add_passkey("laptop").await.unwrap();
    assert_eq!(service.credentials().len(), 2);

    let second_credential = service.credentials()[1].id.clone();

    service.lock();
    auth.use_credential(&second_credential);
    service.unlock().await.unwrap();

    assert_eq!(service.items().unwrap()[0].content, "1234-5678");
}

#[tokio::test]
async fn removing_the_last_passkey_is_refused() {
    let (mut service, _store, _auth) = service();
    service.initialize().await.unwrap();
    service.setup("alice", "phone").await.unwrap();

    let only_credential = service.credentials()[0].id.clone();
    let err = service.remove_passkey(&only_credential).await.unwrap_err();
    assert!(matches!(err, VaultError::LastPasskey));
}

#[tokio::test]
async fn file_item_round_trips_exact_bytes() {
    let (mut service, _store, _auth) = service();
    service.initialize().await.unwrap();
    service.setup("alice", "phone").await.unwrap();

    let data = [0x00u8, 0x01, 0x02, 0xFF, 0xFE, 0xFD];
    let id = service
        .add_file_item(&data, "backup key", "key.bin", "application/octet-stream")
        .await
        .unwrap();

    let decrypted = service.get_decrypted_file(id).await.unwrap();
    assert_eq!(decrypted.bytes, data);
    assert_eq!(decrypted.file_name, "key.bin");
}

#[tokio::test]
async fn tampering_with_the_encrypted_vault_is_detected_as_decryption_failure() {
    let (mut service, store, _auth) = service();
    service.initialize().await.unwrap();
    service.setup("alice", "phone").await.unwrap();
    service.lock();

    let mut blob = store.get(KEY_ENCRYPTED_VAULT).await.unwrap().unwrap();
    let last = blob.len() - 1;
    blob[last] ^= 0x01;
    store.set(KEY_ENCRYPTED_VAULT, blob).await.unwrap();

    let err = service.unlock().await.unwrap_err();
    assert!(matches!(err, VaultError::DecryptionFailed));
}

#[tokio::test]
async fn unknown_item_type_in_the_decrypted_document_is_reported_as_vault_corrupted() {
    let (mut service, store, auth) = service();
    service.initialize().await.unwrap();
    service.setup("alice", "phone").await.unwrap();

    service
        .add_vault_item(AddItemKind::Password(NewPasswordItem {
            title: "github".to_string(),
            content: "hunter2".to_string(),
            url: None,
            username: None,
        }))
        .await
        .unwrap();

    let credential = service.credentials()[0].clone();
    service.lock();

    // Recover the real DEK exactly the way `unlock` does: authenticate,
    // derive the KEK, unwrap the stored `WrappedDEK`.
    let (_, prf_output) = auth
        .authenticate_any(std::slice::from_ref(&credential))
        .await
        .unwrap();
    let kek = kdf::derive_kek(&prf_output, &credential.prf_salt).unwrap();

    let adapter = PersistenceAdapter::new(store.clone());
    let wrapped = adapter
        .load_wrapped_deks()
        .await
        .unwrap()
        .into_iter()
        .find(|w| w.credential_id == credential.id)
        .unwrap();
    let dek = envelope::unwrap(&wrapped.wrapped_key, &kek).unwrap();

    // Decrypt the real document, give its one item an unknown `type`, and
    // re-encrypt with the same DEK — a tampered *plaintext*, not ciphertext.
    let encoded = adapter.load_encrypted_vault().await.unwrap().unwrap();
    let blob = bytes::decode_base64(&encoded).unwrap();
    let plaintext = aead::decrypt(&dek, &blob, &[]).unwrap();
    let mut document: serde_json::Value = serde_json::from_slice(&plaintext).unwrap();
    document["items"][0]["type"] = json!("unknown-type");

    let tampered_plaintext = serde_json::to_vec(&document).unwrap();
    let tampered_blob = aead::encrypt(&dek, &tampered_plaintext, &[]).unwrap();
    let tampered_encoded = bytes::encode_base64(&tampered_blob);
    adapter.save_encrypted_vault(&tampered_encoded).await.unwrap();

    let err = service.unlock().await.unwrap_err();
    assert!(matches!(err, VaultError::VaultCorrupted { .. }));
}

#[tokio::test]
async fn case_insensitive_search_matches_title_and_username() {
    let (mut service, _store, _auth) = service();
    service.initialize().await.unwrap();
    service.setup("alice", "phone").await.unwrap();

    service
        .add_vault_item(AddItemKind::Password(NewPasswordItem {
            title: "GitHub".to_string(),
            content: "secret".to_string(),
            url: None,
            username: Some("Alice123".to_string()),
        }))
        .await
        .unwrap();

    assert_eq!(service.search("github").len(), 1);
    assert_eq!(service.search("alice123").len(), 1);
    assert_eq!(service.search("no-such-query").len(), 0);
}

#[tokio::test]
async fn reset_returns_to_uninitialised_and_drops_all_items() {
    let (mut service, _store, _auth) = service();
    service.initialize().await.unwrap();
    service.setup("alice", "phone").await.unwrap();

    service
        .add_vault_item(AddItemKind::Note(NewNoteItem {
            title: "n".to_string(),
            content: "c".to_string(),
        }))
        .await
        .unwrap();

    service.reset().await.unwrap();
    assert_eq!(service.state(), VaultState::Uninitialised);
    assert!(service.credentials().is_empty());

    service.initialize().await.unwrap();
    assert_eq!(service.state(), VaultState::Uninitialised);
}
