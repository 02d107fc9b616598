//! Flat error taxonomy for the `VaultService` boundary (spec §7).
//!
//! Every failure mode the core can produce surfaces as a variant here; there
//! is no subclassing and no nested "kind" enums. Variants never carry
//! decrypted secret content, only enough to diagnose the failure.

use thiserror::Error;

use crate::aead::AeadError;
use crate::authenticator::AuthError;
use crate::envelope::EnvelopeError;
use crate::file_crypto::MAX_FILE_SIZE;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("no credentials are enrolled")]
    NoCredentials,

    #[error("refusing to remove the last passkey")]
    LastPasskey,

    #[error("passkey not found: {0}")]
    PasskeyNotFound(String),

    #[error("vault is locked")]
    VaultLocked,

    #[error("vault is already initialised")]
    AlreadyInitialised,

    #[error("vault is not initialised")]
    NotInitialised,

    #[error("authentication was cancelled by the user")]
    AuthCancelled,

    #[error("authenticator operation timed out")]
    AuthTimeout,

    #[error("authenticator does not support PRF")]
    PrfNotSupported,

    #[error("authenticator response did not include a PRF result")]
    PrfNotEnabled,

    #[error("decryption failed")]
    DecryptionFailed,

    #[error("vault corrupted: {reason}")]
    VaultCorrupted { reason: String },

    #[error("file exceeds the {limit}-byte size limit", limit = MAX_FILE_SIZE)]
    FileTooLarge,

    #[error("item not found: {0}")]
    ItemNotFound(String),

    #[error("item is not a file")]
    ItemNotAFile,

    #[error("storage error: {cause}")]
    StorageError { cause: String },
}

impl From<AeadError> for VaultError {
    fn from(_: AeadError) -> Self {
        VaultError::DecryptionFailed
    }
}

impl From<EnvelopeError> for VaultError {
    fn from(_: EnvelopeError) -> Self {
        VaultError::DecryptionFailed
    }
}

impl From<StorageError> for VaultError {
    fn from(err: StorageError) -> Self {
        VaultError::StorageError {
            cause: err.to_string(),
        }
    }
}

impl From<AuthError> for VaultError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Cancelled => VaultError::AuthCancelled,
            AuthError::Timeout => VaultError::AuthTimeout,
            AuthError::PrfNotSupported => VaultError::PrfNotSupported,
            AuthError::PrfNotEnabled => VaultError::PrfNotEnabled,
        }
    }
}
