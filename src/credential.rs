//! Credential, wrapped-key, and metadata records (spec §3).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthenticatorType {
    Platform,
    CrossPlatform,
}

/// One enrolled authenticator. `id`/`raw_id` are base64url-without-padding
/// (§6.4); `prf_salt` doubles as the PRF evaluation input and the HKDF salt
/// for this credential, and must be unique per credential (domain
/// separation between credentials).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub id: String,
    pub raw_id: String,
    pub name: String,
    pub created_at: u64,
    pub last_used_at: u64,
    pub prf_salt: String,
    pub authenticator_type: AuthenticatorType,
}

/// The DEK encrypted under one credential's KEK (spec §3). Invariant:
/// exactly one of these exists per stored `Credential`, and unwrapping it
/// with that credential's KEK yields the vault's single logical DEK.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrappedDek {
    pub credential_id: String,
    pub wrapped_key: String,
    pub created_at: u64,
    pub prf_salt: String,
}

/// Stored in the clear: does not leak item content, used to detect vault
/// existence and drive UI without unlocking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultMetadata {
    pub version: u32,
    pub created_at: u64,
    pub modified_at: u64,
    pub item_count: usize,
}

/// `prfSalt` format fixed by §6.1: `"passwordless-encryption-v1-" ‖
/// base64url(16 random bytes)`.
pub fn generate_prf_salt() -> String {
    let random = crate::bytes::random_bytes::<16>();
    format!(
        "passwordless-encryption-v1-{}",
        crate::bytes::encode_base64url(&random)
    )
}
