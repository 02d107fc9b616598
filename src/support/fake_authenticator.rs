//! A deterministic, in-process stand-in for a real WebAuthn/PRF
//! authenticator (spec §1 "External collaborators", §6.1).
//!
//! Simulates one physical authenticator: every credential it creates
//! shares the same hidden "hardware secret", and PRF evaluation is
//! `SHA-256(hardware_secret ‖ prf_salt)`, so re-authenticating with the
//! same credential always reproduces the same PRF output, and different
//! credentials (different salts) never collide. Tests script cancellation
//! and credential selection through `fail_next`/`use_credential`.

use std::sync::{Arc, Mutex};

use sha2::{Digest, Sha256};

use crate::authenticator::{AuthError, AuthenticatorClient, PrfOutput};
use crate::bytes::{encode_base64url, random_bytes};
use crate::credential::{generate_prf_salt, AuthenticatorType, Credential};

struct Inner {
    hardware_secret: [u8; 32],
    scripted_failure: Mutex<Option<AuthError>>,
    selected_credential: Mutex<Option<String>>,
}

/// Cloning shares the same simulated hardware secret and any pending
/// scripted behaviour, so a test can hold a handle alongside the one
/// handed to `VaultService` and drive `fail_next`/`use_credential` on it.
#[derive(Clone)]
pub struct FakeAuthenticator {
    inner: Arc<Inner>,
}

impl Default for FakeAuthenticator {
    fn default() -> Self {
        Self {
            inner: Arc::new(Inner {
                hardware_secret: random_bytes::<32>(),
                scripted_failure: Mutex::new(None),
                selected_credential: Mutex::new(None),
            }),
        }
    }
}

impl FakeAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `create_credential`/`authenticate_any` call fail with
    /// `error` instead of succeeding.
    pub fn fail_next(&self, error: AuthError) {
        *self.inner.scripted_failure.lock().unwrap() = Some(error);
    }

    /// Pin which enrolled credential `authenticate_any` picks, instead of
    /// the default (the last one passed in).
    pub fn use_credential(&self, credential_id: &str) {
        *self.inner.selected_credential.lock().unwrap() = Some(credential_id.to_string());
    }

    fn take_scripted_failure(&self) -> Option<AuthError> {
        self.inner.scripted_failure.lock().unwrap().take()
    }

    fn evaluate_prf(&self, salt: &str) -> PrfOutput {
        let mut hasher = Sha256::new();
        hasher.update(self.inner.hardware_secret);
        hasher.update(salt.as_bytes());
        hasher.finalize().into()
    }
}

impl AuthenticatorClient for FakeAuthenticator {
    async fn create_credential(
        &self,
        _user_name: &str,
        passkey_name: &str,
    ) -> Result<(Credential, PrfOutput), AuthError> {
        if let Some(err) = self.take_scripted_failure() {
            return Err(err);
        }

        let raw_id = encode_base64url(&random_bytes::<16>());
        let prf_salt = generate_prf_salt();
        let prf_output = self.evaluate_prf(&prf_salt);

        let credential = Credential {
            id: raw_id.clone(),
            raw_id,
            name: passkey_name.to_string(),
            created_at: 0,
            last_used_at: 0,
            prf_salt,
            authenticator_type: AuthenticatorType::Platform,
        };

        Ok((credential, prf_output))
    }

    async fn authenticate_any(
        &self,
        credentials: &[Credential],
    ) -> Result<(String, PrfOutput), AuthError> {
        if let Some(err) = self.take_scripted_failure() {
            return Err(err);
        }

        let selected = self.inner.selected_credential.lock().unwrap().take();
        let credential = match selected {
            Some(id) => credentials
                .iter()
                .find(|c| c.id == id)
                .ok_or(AuthError::Cancelled)?,
            None => credentials.last().ok_or(AuthError::Cancelled)?,
        };

        Ok((credential.id.clone(), self.evaluate_prf(&credential.prf_salt)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_credential_reproduces_the_same_prf_output() {
        let auth = FakeAuthenticator::new();
        let (credential, prf_at_creation) = auth.create_credential("alice", "phone").await.unwrap();

        let (id, prf_at_auth) = auth
            .authenticate_any(std::slice::from_ref(&credential))
            .await
            .unwrap();
        assert_eq!(id, credential.id);
        assert_eq!(prf_at_auth, prf_at_creation);
    }

    #[tokio::test]
    async fn different_credentials_yield_different_prf_outputs() {
        let auth = FakeAuthenticator::new();
        let (a, prf_a) = auth.create_credential("alice", "phone").await.unwrap();
        let (_b, prf_b) = auth.create_credential("alice", "key").await.unwrap();
        assert_ne!(prf_a, prf_b);
        assert_ne!(a.prf_salt, "");
    }

    #[tokio::test]
    async fn fail_next_is_honoured_once() {
        let auth = FakeAuthenticator::new();
        auth.fail_next(AuthError::Cancelled);

        assert!(auth.create_credential("alice", "phone").await.is_err());
        assert!(auth.create_credential("alice", "phone").await.is_ok());
    }

    #[tokio::test]
    async fn use_credential_pins_selection() {
        let auth = FakeAuthenticator::new();
        let (first, _) = auth.create_credential("alice", "phone").await.unwrap();
        let (second, _) = auth.create_credential("alice", "key").await.unwrap();

        auth.use_credential(&first.id);
        let (chosen, _) = auth
            .authenticate_any(&[first.clone(), second.clone()])
            .await
            .unwrap();
        assert_eq!(chosen, first.id);
    }
}
