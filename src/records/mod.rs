//! Credential Record persistence.
//!
//! The record store is the remote service's per-principal slot: one record per
//! user, overwritten on every wallet setup, read on every unlock.

pub mod file;
pub mod memory;

pub use file::FileRecordStore;
pub use memory::MemoryRecordStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::wallet::EncryptedWallet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    /// base64url credential id, no padding.
    pub credential_id: String,
    /// base64url COSE public key from the registration response.
    pub public_key: String,
    /// Milliseconds since the Unix epoch.
    pub created_at: u64,
    pub encrypted_wallet: EncryptedWallet,
}

#[derive(Debug, thiserror::Error)]
pub enum RecordStoreError {
    /// The store answered with its `err` variant.
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("unavailable: {0}")]
    Unavailable(String),
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialize: {0}")]
    Serialization(String),
}

/// The two calls the wallet flow makes against the remote store. Handles are bound
/// to the calling principal.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Store `record` for the caller, replacing any previous one.
    async fn create_user_credential(&self, record: CredentialRecord) -> Result<(), RecordStoreError>;

    /// The caller's record, if one exists.
    async fn get_my_credential(&self) -> Result<Option<CredentialRecord>, RecordStoreError>;
}
