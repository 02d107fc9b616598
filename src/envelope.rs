//! DEK lifecycle management: generation, wrapping, and rotation (spec §2
//! C4, §4.3).
//!
//! The wrap/unwrap operations are AES-256-GCM encrypt/decrypt of the DEK's
//! raw bytes under a KEK, independent of the vault-document AEAD in
//! [`crate::aead`] (different key, same cipher). Wrapping is intentionally
//! kept distinct from [`crate::aead::encrypt`] so that a `WrapKey` can never
//! be handed to the payload-encryption path, and a DEK is never encrypted
//! under anything but a `WrapKey`.

use aes_gcm::aead::{Aead, Payload};
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use thiserror::Error;

use crate::aead::NONCE_LEN;
use crate::bytes::{decode_base64, encode_base64, random_bytes, random_vec};
use crate::kdf::{AeadKey, WrapKey};

pub const DEK_LEN: usize = 32;

/// Opaque by policy, matching [`crate::aead::AeadError`]: bad MAC, wrong
/// KEK, and truncation are indistinguishable to the caller.
#[derive(Debug, Error)]
#[error("failed to unwrap key")]
pub struct EnvelopeError;

/// Generate a fresh, extractable 256-bit DEK. Called exactly once per
/// vault, at `setup` (spec §3: at most one logical DEK per vault history).
pub fn generate_dek() -> AeadKey {
    AeadKey::from_raw(random_vec(DEK_LEN))
}

/// Wrap `dek` under `kek`. Returns base64(`nonce(12) ‖ ciphertext ‖ tag`)
/// with a fresh nonce per call — the on-disk form of `WrappedDEK.wrappedKey`
/// (spec §6.3).
pub fn wrap(dek: &AeadKey, kek: &WrapKey) -> Result<String, EnvelopeError> {
    let cipher = Aes256Gcm::new_from_slice(kek.expose()).map_err(|_| EnvelopeError)?;
    let nonce_bytes = random_bytes::<NONCE_LEN>();
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(
            nonce,
            Payload {
                msg: dek.expose(),
                aad: &[],
            },
        )
        .map_err(|_| EnvelopeError)?;

    let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);
    Ok(encode_base64(&blob))
}

/// Unwrap a blob produced by [`wrap`], recovering the DEK as an extractable
/// AEAD key. On any failure returns the single opaque [`EnvelopeError`].
pub fn unwrap(wrapped: &str, kek: &WrapKey) -> Result<AeadKey, EnvelopeError> {
    let blob = decode_base64(wrapped).map_err(|_| EnvelopeError)?;
    if blob.len() < NONCE_LEN {
        return Err(EnvelopeError);
    }
    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);

    let cipher = Aes256Gcm::new_from_slice(kek.expose()).map_err(|_| EnvelopeError)?;
    let nonce = Nonce::from_slice(nonce_bytes);

    let dek_bytes = cipher
        .decrypt(
            nonce,
            Payload {
                msg: ciphertext,
                aad: &[],
            },
        )
        .map_err(|_| EnvelopeError)?;

    Ok(AeadKey::from_raw(dek_bytes))
}

/// Re-wrap a `WrappedDEK` blob under a new KEK: unwrap under `old_kek`,
/// then wrap under `new_kek`. Atomic at the component boundary — either
/// returns a valid new blob or nothing observable is left behind (no
/// partial writes happen inside this function; it only touches in-memory
/// values).
pub fn rotate_wrapper(
    wrapped: &str,
    old_kek: &WrapKey,
    new_kek: &WrapKey,
) -> Result<String, EnvelopeError> {
    let dek = unwrap(wrapped, old_kek)?;
    wrap(&dek, new_kek)
}
