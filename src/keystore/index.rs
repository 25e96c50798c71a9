use std::collections::HashMap;
use std::path::PathBuf;
use zeroize::Zeroizing;

use super::{KeyStoreError, ResidentKey, disk};

struct DiskBacking {
    aes_key: Zeroizing<[u8; 32]>,
    dir: PathBuf,
}

/// Resident keys indexed by credential id and by rpIdHash, optionally mirrored to
/// an encrypted directory.
pub struct KeyStore {
    backing: Option<DiskBacking>,
    by_id: HashMap<[u8; 32], ResidentKey>,
    by_rp: HashMap<[u8; 32], Vec<[u8; 32]>>,
}

impl KeyStore {
    /// A store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            backing: None,
            by_id: HashMap::new(),
            by_rp: HashMap::new(),
        }
    }

    /// Load all keys from `dir` into memory; later writes go to the same directory.
    pub fn load(aes_key: [u8; 32], dir: PathBuf) -> Result<Self, KeyStoreError> {
        let aes_key = Zeroizing::new(aes_key);
        let records = disk::load_all(&aes_key, &dir)?;
        let mut store = Self {
            backing: Some(DiskBacking { aes_key, dir }),
            by_id: HashMap::new(),
            by_rp: HashMap::new(),
        };
        for record in records {
            let credential_id = crate::codec::to_hex(&record.credential_id);
            if let Err(e) = store.index(record) {
                tracing::warn!(credential_id = %credential_id, error = %e, "Skipping malformed resident key");
            }
        }
        Ok(store)
    }

    fn keys_of(record: &ResidentKey) -> Result<([u8; 32], [u8; 32]), KeyStoreError> {
        let id = record
            .id_array()
            .ok_or_else(|| KeyStoreError::Corrupt("credential_id not 32 bytes".into()))?;
        let rp = record
            .rp_array()
            .ok_or_else(|| KeyStoreError::Corrupt("rp_id_hash not 32 bytes".into()))?;
        Ok((id, rp))
    }

    fn index(&mut self, record: ResidentKey) -> Result<(), KeyStoreError> {
        let (id, rp) = Self::keys_of(&record)?;
        let ids = self.by_rp.entry(rp).or_default();
        if !ids.contains(&id) {
            ids.push(id);
        }
        self.by_id.insert(id, record);
        Ok(())
    }

    fn persist(&self, record: &ResidentKey) -> Result<(), KeyStoreError> {
        match &self.backing {
            Some(backing) => disk::write_key(&backing.aes_key, &backing.dir, record),
            None => Ok(()),
        }
    }

    /// Add a new key: write it through, then index it.
    pub fn add(&mut self, record: ResidentKey) -> Result<(), KeyStoreError> {
        Self::keys_of(&record)?;
        self.persist(&record)?;
        self.index(record)
    }

    pub fn get_by_id(&self, id: &[u8]) -> Option<&ResidentKey> {
        let id: [u8; 32] = id.try_into().ok()?;
        self.by_id.get(&id)
    }

    /// All keys for an rpIdHash, most recently created first.
    pub fn get_by_rp_hash(&self, rp_id_hash: &[u8]) -> Vec<&ResidentKey> {
        let Ok(rp) = <[u8; 32]>::try_from(rp_id_hash) else {
            return Vec::new();
        };
        let Some(ids) = self.by_rp.get(&rp) else {
            return Vec::new();
        };
        let mut records: Vec<&ResidentKey> =
            ids.iter().filter_map(|id| self.by_id.get(id)).collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }

    /// Increment and persist the signature counter, returning the new value.
    pub fn increment_sign_count(&mut self, id: &[u8]) -> Result<u32, KeyStoreError> {
        let id: [u8; 32] = id.try_into().map_err(|_| KeyStoreError::NotFound)?;
        let mut updated = self.by_id.get(&id).ok_or(KeyStoreError::NotFound)?.clone();
        updated.sign_count = updated.sign_count.wrapping_add(1);
        // Memory only moves once the disk copy has.
        self.persist(&updated)?;
        let sign_count = updated.sign_count;
        self.by_id.insert(id, updated);
        Ok(sign_count)
    }

    /// Remove a key from memory and disk. Returns false if it was not present.
    pub fn remove(&mut self, id: &[u8]) -> Result<bool, KeyStoreError> {
        let Ok(id) = <[u8; 32]>::try_from(id) else {
            return Ok(false);
        };
        let Some(record) = self.by_id.remove(&id) else {
            return Ok(false);
        };
        if let Some(backing) = &self.backing {
            disk::delete_key(&backing.dir, &record.credential_id)?;
        }
        if let Some(rp) = record.rp_array() {
            if let Some(ids) = self.by_rp.get_mut(&rp) {
                ids.retain(|i| i != &id);
                if ids.is_empty() {
                    self.by_rp.remove(&rp);
                }
            }
        }
        Ok(true)
    }

    pub fn credential_count(&self) -> usize {
        self.by_id.len()
    }
}
