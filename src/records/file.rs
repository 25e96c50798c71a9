use async_trait::async_trait;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use super::{CredentialRecord, RecordStore, RecordStoreError};
use crate::codec::to_hex;

/// One JSON file per principal under `dir`. Concurrent writers race on the final
/// rename; the last one wins.
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    dir: PathBuf,
    principal: String,
}

impl FileRecordStore {
    pub fn new(dir: impl Into<PathBuf>, principal: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            principal: principal.into(),
        }
    }

    pub fn record_path(&self) -> PathBuf {
        let digest = Sha256::digest(self.principal.as_bytes());
        self.dir.join(format!("{}.json", to_hex(&digest)))
    }

    /// Remove the caller's record. Returns false if there was none.
    pub fn delete(&self) -> Result<bool, RecordStoreError> {
        match std::fs::remove_file(self.record_path()) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

fn write_record(dir: &Path, path: &Path, record: &CredentialRecord) -> Result<(), RecordStoreError> {
    std::fs::create_dir_all(dir)?;
    let json = serde_json::to_vec_pretty(record)
        .map_err(|e| RecordStoreError::Serialization(e.to_string()))?;
    let suffix: u64 = rand::thread_rng().r#gen();
    let tmp = path.with_extension(format!("{suffix:016x}.tmp"));
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

fn read_record(path: &Path) -> Result<Option<CredentialRecord>, RecordStoreError> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| RecordStoreError::Serialization(e.to_string()))
}

#[async_trait]
impl RecordStore for FileRecordStore {
    async fn create_user_credential(&self, record: CredentialRecord) -> Result<(), RecordStoreError> {
        if record.credential_id.is_empty() {
            return Err(RecordStoreError::Rejected("credentialId must not be empty".into()));
        }
        let dir = self.dir.clone();
        let path = self.record_path();
        tokio::task::spawn_blocking(move || write_record(&dir, &path, &record))
            .await
            .map_err(|e| RecordStoreError::Unavailable(format!("write task: {e}")))??;
        tracing::debug!(path = %self.record_path().display(), "Credential record written");
        Ok(())
    }

    async fn get_my_credential(&self) -> Result<Option<CredentialRecord>, RecordStoreError> {
        let path = self.record_path();
        tokio::task::spawn_blocking(move || read_record(&path))
            .await
            .map_err(|e| RecordStoreError::Unavailable(format!("read task: {e}")))?
    }
}
