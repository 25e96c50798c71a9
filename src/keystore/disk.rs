use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use rand::RngCore;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

use super::{KeyStoreError, ResidentKey};
use crate::codec::to_hex;

const NONCE_LEN: usize = 12;

fn key_path(dir: &Path, credential_id: &[u8]) -> PathBuf {
    dir.join(format!("{}.bin", to_hex(credential_id)))
}

/// Seal `record` as `nonce || AES-256-GCM(CBOR(record))` into `dir/{id_hex}.bin`.
pub(crate) fn write_key(
    aes_key: &[u8; 32],
    dir: &Path,
    record: &ResidentKey,
) -> Result<(), KeyStoreError> {
    let mut plaintext = Zeroizing::new(Vec::new());
    ciborium::into_writer(record, &mut *plaintext)
        .map_err(|e| KeyStoreError::Serialization(e.to_string()))?;

    let mut nonce = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce);

    let cipher = Aes256Gcm::new_from_slice(aes_key)
        .map_err(|e| KeyStoreError::Encryption(e.to_string()))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext.as_slice())
        .map_err(|e| KeyStoreError::Encryption(e.to_string()))?;

    let mut file_bytes = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    file_bytes.extend_from_slice(&nonce);
    file_bytes.extend_from_slice(&ciphertext);

    // Sign-count updates rewrite the file; never leave a half-written key behind.
    let path = key_path(dir, &record.credential_id);
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, file_bytes)?;
    std::fs::rename(&tmp, &path)?;
    Ok(())
}

pub(crate) fn read_key(aes_key: &[u8; 32], path: &Path) -> Result<ResidentKey, KeyStoreError> {
    let bytes = std::fs::read(path)?;
    if bytes.len() < NONCE_LEN {
        return Err(KeyStoreError::Corrupt("file too short".into()));
    }
    let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);

    let cipher = Aes256Gcm::new_from_slice(aes_key)
        .map_err(|e| KeyStoreError::Encryption(e.to_string()))?;
    let plaintext = Zeroizing::new(
        cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|e| KeyStoreError::Encryption(e.to_string()))?,
    );

    ciborium::from_reader(plaintext.as_slice())
        .map_err(|e| KeyStoreError::Serialization(e.to_string()))
}

pub(crate) fn delete_key(dir: &Path, credential_id: &[u8]) -> Result<(), KeyStoreError> {
    std::fs::remove_file(key_path(dir, credential_id))?;
    Ok(())
}

/// Load every readable key in `dir`; unreadable `.bin` files are logged and skipped.
pub(crate) fn load_all(aes_key: &[u8; 32], dir: &Path) -> Result<Vec<ResidentKey>, KeyStoreError> {
    let mut records = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("bin") {
            continue;
        }
        match read_key(aes_key, &path) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable resident key");
            }
        }
    }
    Ok(records)
}
