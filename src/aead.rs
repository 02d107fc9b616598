//! AES-256-GCM authenticated encryption with strict nonce discipline
//! (spec §2 C3, §4.2).
//!
//! Nonces are never caller-supplied: encryption is the only nonce source,
//! drawn fresh from the CSPRNG on every call, which is the only way to
//! prevent nonce reuse "by construction". The 12-byte nonce is prepended to
//! the AES-GCM output (ciphertext ‖ 16-byte tag) with no length prefix.

use aes_gcm::aead::{Aead, Payload};
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use thiserror::Error;

use crate::bytes::{decode_base64, encode_base64, random_bytes};
use crate::kdf::AeadKey;

pub const NONCE_LEN: usize = 12;

/// Opaque by policy (§4.2): the component never distinguishes "wrong key"
/// from "tampered ciphertext" from "truncated input" in what it returns.
#[derive(Debug, Error)]
#[error("decryption failed")]
pub struct AeadError;

/// Encrypt `plaintext` under `key`, with optional associated data. Returns
/// `nonce(12) ‖ ciphertext ‖ tag(16)` as one contiguous buffer.
pub fn encrypt(key: &AeadKey, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>, AeadError> {
    let cipher = Aes256Gcm::new_from_slice(key.expose()).map_err(|_| AeadError)?;
    let nonce_bytes = random_bytes::<NONCE_LEN>();
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|_| AeadError)?;

    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt a buffer produced by [`encrypt`]. `aad` must match what was
/// passed at encryption time, or this fails the same opaque way tampering
/// would.
pub fn decrypt(key: &AeadKey, blob: &[u8], aad: &[u8]) -> Result<Vec<u8>, AeadError> {
    if blob.len() < NONCE_LEN {
        return Err(AeadError);
    }
    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new_from_slice(key.expose()).map_err(|_| AeadError)?;
    let nonce = Nonce::from_slice(nonce_bytes);

    cipher
        .decrypt(
            nonce,
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| AeadError)
}

/// Convenience codec: serialise `value` to JSON, UTF-8 encode, encrypt, and
/// base64-encode the result. This is the on-disk representation of the
/// vault document (§4.2, §6.3).
pub fn encrypt_json<T: serde::Serialize>(
    key: &AeadKey,
    value: &T,
    aad: &[u8],
) -> Result<String, AeadError> {
    let plaintext = serde_json::to_vec(value).map_err(|_| AeadError)?;
    let blob = encrypt(key, &plaintext, aad)?;
    Ok(encode_base64(&blob))
}

/// Inverse of [`encrypt_json`].
pub fn decrypt_json<T: serde::de::DeserializeOwned>(
    key: &AeadKey,
    encoded: &str,
    aad: &[u8],
) -> Result<T, AeadError> {
    let blob = decode_base64(encoded).map_err(|_| AeadError)?;
    let plaintext = decrypt(key, &blob, aad)?;
    serde_json::from_slice(&plaintext).map_err(|_| AeadError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf::derive_dek_reserved;

    fn test_key() -> AeadKey {
        derive_dek_reserved(b"ikm-for-tests", "salt-for-tests").unwrap()
    }

    #[test]
    fn roundtrip() {
        let key = test_key();
        let ct = encrypt(&key, b"hello world", b"aad").unwrap();
        let pt = decrypt(&key, &ct, b"aad").unwrap();
        assert_eq!(pt, b"hello world");
    }

    #[test]
    fn tamper_is_rejected() {
        let key = test_key();
        let mut ct = encrypt(&key, b"hello world", b"aad").unwrap();
        let last = ct.len() - 1;
        ct[last] ^= 0x01;
        assert!(decrypt(&key, &ct, b"aad").is_err());
    }

    #[test]
    fn aad_mismatch_is_rejected() {
        let key = test_key();
        let ct = encrypt(&key, b"hello world", b"aad-1").unwrap();
        assert!(decrypt(&key, &ct, b"aad-2").is_err());
    }

    #[test]
    fn truncated_input_is_rejected() {
        let key = test_key();
        assert!(decrypt(&key, &[0u8; 4], b"").is_err());
    }

    #[test]
    fn repeated_encryptions_produce_distinct_ciphertexts() {
        let key = test_key();
        let a = encrypt(&key, b"same message", b"").unwrap();
        let b = encrypt(&key, b"same message", b"").unwrap();
        assert_ne!(a, b, "nonces must differ between calls");
    }

    #[test]
    fn json_codec_roundtrip() {
        let key = test_key();
        let value = serde_json::json!({"a": 1, "b": "two"});
        let encoded = encrypt_json(&key, &value, b"aad").unwrap();
        let decoded: serde_json::Value = decrypt_json(&key, &encoded, b"aad").unwrap();
        assert_eq!(decoded, value);
    }
}
