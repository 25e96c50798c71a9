use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::{CredentialRecord, RecordStore, RecordStoreError};

#[derive(Default)]
struct Backend {
    records: RwLock<HashMap<String, CredentialRecord>>,
    offline: AtomicBool,
}

/// Process-local record store. Clones share one backend; each handle answers for
/// the principal it was created for.
#[derive(Clone)]
pub struct MemoryRecordStore {
    backend: Arc<Backend>,
    principal: String,
}

impl MemoryRecordStore {
    pub fn new(principal: impl Into<String>) -> Self {
        Self {
            backend: Arc::default(),
            principal: principal.into(),
        }
    }

    /// A handle on the same backend acting as another principal.
    pub fn for_principal(&self, principal: impl Into<String>) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            principal: principal.into(),
        }
    }

    pub fn principal(&self) -> &str {
        &self.principal
    }

    /// Simulate the remote service going away (or coming back).
    pub fn set_offline(&self, offline: bool) {
        self.backend.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), RecordStoreError> {
        if self.backend.offline.load(Ordering::SeqCst) {
            return Err(RecordStoreError::Unavailable("record store offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create_user_credential(&self, record: CredentialRecord) -> Result<(), RecordStoreError> {
        self.check_online()?;
        if record.credential_id.is_empty() {
            return Err(RecordStoreError::Rejected("credentialId must not be empty".into()));
        }
        self.backend
            .records
            .write()
            .await
            .insert(self.principal.clone(), record);
        Ok(())
    }

    async fn get_my_credential(&self) -> Result<Option<CredentialRecord>, RecordStoreError> {
        self.check_online()?;
        Ok(self.backend.records.read().await.get(&self.principal).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::EncryptedWallet;

    fn record(id: &str) -> CredentialRecord {
        CredentialRecord {
            credential_id: id.into(),
            public_key: "pk".into(),
            created_at: 1,
            encrypted_wallet: EncryptedWallet { iv: vec![0; 12], data: vec![0; 16] },
        }
    }

    #[tokio::test]
    async fn test_shared_backend() {
        let alice = MemoryRecordStore::new("alice");
        let alice_again = alice.clone();
        let bob = alice.for_principal("bob");
        assert_eq!(bob.principal(), "bob");

        alice.create_user_credential(record("a")).await.unwrap();
        assert_eq!(alice_again.get_my_credential().await.unwrap(), Some(record("a")));
        assert!(bob.get_my_credential().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_offline() {
        let store = MemoryRecordStore::new("alice");
        store.set_offline(true);
        assert!(matches!(
            store.create_user_credential(record("a")).await,
            Err(RecordStoreError::Unavailable(_))
        ));
        assert!(matches!(store.get_my_credential().await, Err(RecordStoreError::Unavailable(_))));
        store.set_offline(false);
        assert!(store.get_my_credential().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_empty_id() {
        let store = MemoryRecordStore::new("alice");
        assert!(matches!(
            store.create_user_credential(record("")).await,
            Err(RecordStoreError::Rejected(_))
        ));
    }
}
