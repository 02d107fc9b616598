//! A client-side encrypted personal vault unlocked by a hardware-bound
//! passkey (WebAuthn PRF), using envelope encryption: one random DEK
//! wrapped independently under a KEK derived from each enrolled
//! credential's PRF output.
//!
//! [`service::VaultService`] is the entry point: it is generic over a
//! [`storage::KVStore`] and an [`authenticator::AuthenticatorClient`], so
//! this crate never depends on a concrete storage backend or a real
//! WebAuthn implementation. [`support`] ships reference implementations of
//! both for tests and the demo CLI.

pub mod aead;
pub mod authenticator;
pub mod bytes;
pub mod credential;
pub mod envelope;
pub mod error;
pub mod file_crypto;
pub mod items;
pub mod kdf;
pub mod password;
pub mod schema;
pub mod service;
pub mod storage;
pub mod support;

pub use error::VaultError;
pub use service::{VaultService, VaultState};
