//! HKDF-SHA256 key derivation with enforced domain separation (spec §2 C2,
//! §4.1).
//!
//! `info`/`salt` are both ASCII byte-exact on-disk contracts: the three
//! labels below MUST NOT change without a vault format-version bump.
//!
//! Keys come out of this module typed by usage (`WrapKey` vs `AeadKey`).
//! There is no conversion between the two: passing a `WrapKey` where an
//! `AeadKey` is expected (or vice versa) is a compile error, not a runtime
//! check — this is the "rejected by construction" requirement from §4.1.

use hkdf::Hkdf;
use secrecy::{ExposeSecret, SecretSlice};
use sha2::Sha256;
use thiserror::Error;

/// HKDF `info` label for key-wrapping keys (KEKs). Part of the on-disk
/// contract; changing this invalidates every previously wrapped DEK.
pub const LABEL_KEK_V1: &str = "Passwordless Encryption KEK V1";

/// HKDF `info` label for direct data-encryption keys. Reserved for a future
/// single-key mode that skips the envelope; unused by the current envelope
/// path.
pub const LABEL_DEK_V1: &str = "Passwordless Encryption DEK V1";

/// HKDF `info` label reserved for a future authenticated-metadata (MAC)
/// feature. Defined so the on-disk label space is reserved; do not
/// repurpose (spec §9 open question).
pub const LABEL_AUTH_V1: &str = "Passwordless Encryption Auth V1";

const DERIVED_KEY_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum KdfError {
    #[error("hkdf expand failed")]
    Expand,
}

/// A 256-bit key usable only for wrapping/unwrapping another key's raw
/// bytes (envelope operations). Never exposed outside the crate's crypto
/// modules and never accepted by the AEAD payload-encryption functions.
pub struct WrapKey(SecretSlice<u8>);

impl WrapKey {
    pub(crate) fn from_raw(bytes: Vec<u8>) -> Self {
        Self(SecretSlice::from(bytes))
    }

    pub(crate) fn expose(&self) -> &[u8] {
        self.0.expose_secret()
    }
}

/// A 256-bit key usable only for AEAD encrypt/decrypt of bulk data (the
/// DEK, and the vault document / file blobs it protects). Never accepted
/// by the envelope wrap/unwrap functions.
pub struct AeadKey(SecretSlice<u8>);

impl AeadKey {
    pub(crate) fn from_raw(bytes: Vec<u8>) -> Self {
        Self(SecretSlice::from(bytes))
    }

    pub(crate) fn expose(&self) -> &[u8] {
        self.0.expose_secret()
    }
}

/// Derive the per-credential KEK from a PRF output, per §4.1. `salt` is the
/// credential's `prfSalt`, used verbatim as UTF-8 bytes.
pub fn derive_kek(prf_output: &[u8], salt: &str) -> Result<WrapKey, KdfError> {
    let raw = derive(prf_output, salt, LABEL_KEK_V1)?;
    Ok(WrapKey::from_raw(raw))
}

/// Derive a direct data-encryption key from input keying material. Defined
/// for the reserved future single-key mode; the envelope path generates the
/// DEK randomly instead of deriving it (see `envelope::generate_dek`).
pub fn derive_dek_reserved(ikm: &[u8], salt: &str) -> Result<AeadKey, KdfError> {
    let raw = derive(ikm, salt, LABEL_DEK_V1)?;
    Ok(AeadKey::from_raw(raw))
}

fn derive(ikm: &[u8], salt: &str, label: &str) -> Result<Vec<u8>, KdfError> {
    let hk = Hkdf::<Sha256>::new(Some(salt.as_bytes()), ikm);
    let mut out = vec![0u8; DERIVED_KEY_LEN];
    hk.expand(label.as_bytes(), &mut out)
        .map_err(|_| KdfError::Expand)?;
    Ok(out)
}
