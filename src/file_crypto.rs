//! Single-shot file encryption (spec §2 C5, §4.4).
//!
//! Each file is encrypted/decrypted as one buffer under the vault's DEK;
//! there is no streaming/incremental mode (spec §1 Non-goals). The
//! ciphertext and its metadata are separate records: the ciphertext lives
//! in the file-blob KV namespace keyed by `fileId`, the metadata travels
//! alongside the vault item that references it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aead::{self, AeadError};
use crate::kdf::AeadKey;

/// Policy limit, not a cryptographic one — AES-GCM's own safety bound
/// (~64 GiB/key/message under a 96-bit nonce) is far larger.
pub const MAX_FILE_SIZE: usize = 100 * 1024 * 1024;

const DEFAULT_MIME: &str = "application/octet-stream";
const METADATA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum FileCryptoError {
    #[error("file exceeds the {MAX_FILE_SIZE}-byte size limit")]
    FileTooLarge,
    #[error(transparent)]
    Aead(#[from] AeadError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    pub file_name: String,
    pub mime_type: String,
    pub original_size: usize,
    pub version: u32,
}

#[derive(Debug)]
pub struct EncryptedFile {
    pub metadata: FileMetadata,
    pub ciphertext: Vec<u8>,
}

pub struct DecryptedFile {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}

/// Encrypt `plaintext` under the DEK. Rejects input over [`MAX_FILE_SIZE`]
/// before touching the cipher. An absent/empty MIME type falls back to
/// `application/octet-stream`.
pub fn encrypt_file(
    dek: &AeadKey,
    plaintext: &[u8],
    file_name: &str,
    mime_type: &str,
) -> Result<EncryptedFile, FileCryptoError> {
    if plaintext.len() > MAX_FILE_SIZE {
        return Err(FileCryptoError::FileTooLarge);
    }

    let mime_type = if mime_type.trim().is_empty() {
        DEFAULT_MIME.to_string()
    } else {
        mime_type.to_string()
    };

    let ciphertext = aead::encrypt(dek, plaintext, &[])?;

    Ok(EncryptedFile {
        metadata: FileMetadata {
            file_name: file_name.to_string(),
            mime_type,
            original_size: plaintext.len(),
            version: METADATA_VERSION,
        },
        ciphertext,
    })
}

/// Decrypt a ciphertext previously produced by [`encrypt_file`], given its
/// metadata record.
pub fn decrypt_file(
    dek: &AeadKey,
    ciphertext: &[u8],
    metadata: &FileMetadata,
) -> Result<DecryptedFile, FileCryptoError> {
    let bytes = aead::decrypt(dek, ciphertext, &[])?;
    Ok(DecryptedFile {
        bytes,
        file_name: metadata.file_name.clone(),
        mime_type: metadata.mime_type.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf::derive_dek_reserved;

    fn test_key() -> AeadKey {
        derive_dek_reserved(b"ikm-bytes", "salt").unwrap()
    }

    #[test]
    fn roundtrip_preserves_bytes_and_metadata() {
        let key = test_key();
        let data = [0x00u8, 0x01, 0x02, 0xFF, 0xFE, 0xFD];
        let enc = encrypt_file(&key, &data, "bin", "application/octet-stream").unwrap();
        assert_eq!(enc.metadata.original_size, data.len());

        let dec = decrypt_file(&key, &enc.ciphertext, &enc.metadata).unwrap();
        assert_eq!(dec.bytes, data);
        assert_eq!(dec.file_name, "bin");
        assert_eq!(dec.mime_type, "application/octet-stream");
    }

    #[test]
    fn empty_mime_falls_back_to_octet_stream() {
        let key = test_key();
        let enc = encrypt_file(&key, b"data", "note.txt", "").unwrap();
        assert_eq!(enc.metadata.mime_type, DEFAULT_MIME);
    }

    #[test]
    fn oversized_file_is_rejected() {
        let key = test_key();
        let oversized = vec![0u8; MAX_FILE_SIZE + 1];
        let err = encrypt_file(&key, &oversized, "big", "").unwrap_err();
        assert!(matches!(err, FileCryptoError::FileTooLarge));
    }
}
