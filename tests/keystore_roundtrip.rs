use passkey_wallet::keystore::resident::RESIDENT_KEY_VERSION;
use passkey_wallet::keystore::{KeyStore, ResidentKey};

fn make_key(rp_id: &str, user_id: &[u8], credential_id: &[u8; 32], created_at: u64) -> ResidentKey {
    use sha2::{Digest, Sha256};
    let rp_id_hash = Sha256::digest(rp_id.as_bytes()).to_vec();
    ResidentKey {
        version: RESIDENT_KEY_VERSION,
        credential_id: credential_id.to_vec(),
        rp_id: rp_id.to_string(),
        rp_id_hash,
        rp_name: None,
        user_id: user_id.to_vec(),
        user_name: "alice".into(),
        user_display: "Alice".into(),
        public_key_x: vec![0u8; 32],
        public_key_y: vec![1u8; 32],
        private_key: vec![2u8; 32],
        sign_count: 0,
        created_at,
        discoverable: true,
    }
}

#[test]
fn test_keystore_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let key = [0xabu8; 32];
    let cred_id = [0x01u8; 32];

    {
        let mut store = KeyStore::load(key, dir.path().to_path_buf()).unwrap();
        store
            .add(make_key("example.com", b"user1", &cred_id, 1_700_000_000_000))
            .unwrap();
    }

    let store = KeyStore::load(key, dir.path().to_path_buf()).unwrap();
    assert_eq!(store.credential_count(), 1);

    let loaded = store.get_by_id(&cred_id).expect("key not found");
    assert_eq!(loaded.rp_id, "example.com");
    assert_eq!(loaded.user_id, b"user1");
    assert_eq!(loaded.credential_id, cred_id);
    assert_eq!(loaded.private_key, vec![2u8; 32]);
    assert_eq!(loaded.created_at, 1_700_000_000_000);
    assert!(loaded.discoverable);
}

#[test]
fn test_keystore_rp_index_most_recent_first() {
    let dir = tempfile::tempdir().unwrap();
    let key = [0xcd_u8; 32];

    let mut store = KeyStore::load(key, dir.path().to_path_buf()).unwrap();
    store.add(make_key("rp.example", b"user1", &[0x11; 32], 1_000)).unwrap();
    store.add(make_key("rp.example", b"user2", &[0x22; 32], 2_000)).unwrap();
    store.add(make_key("other.example", b"user3", &[0x33; 32], 3_000)).unwrap();
    assert_eq!(store.credential_count(), 3);

    use sha2::{Digest, Sha256};
    let rp_hash = Sha256::digest("rp.example".as_bytes()).to_vec();
    let results = store.get_by_rp_hash(&rp_hash);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].created_at, 2_000);
    assert_eq!(results[1].created_at, 1_000);

    assert!(store.get_by_rp_hash(&[0u8; 32]).is_empty());
    assert!(store.get_by_rp_hash(b"short").is_empty());
}

#[test]
fn test_keystore_sign_count_persists() {
    let dir = tempfile::tempdir().unwrap();
    let key = [0x5a_u8; 32];
    let cred_id = [0x09u8; 32];

    let mut store = KeyStore::load(key, dir.path().to_path_buf()).unwrap();
    store.add(make_key("count.example", b"user", &cred_id, 1)).unwrap();
    assert_eq!(store.increment_sign_count(&cred_id).unwrap(), 1);
    assert_eq!(store.increment_sign_count(&cred_id).unwrap(), 2);
    drop(store);

    let mut store = KeyStore::load(key, dir.path().to_path_buf()).unwrap();
    assert_eq!(store.get_by_id(&cred_id).unwrap().sign_count, 2);
    assert!(store.increment_sign_count(&[0xff; 32]).is_err());
}

#[test]
fn test_keystore_remove() {
    let dir = tempfile::tempdir().unwrap();
    let key = [0xef_u8; 32];
    let cred_id = [0x42u8; 32];

    let mut store = KeyStore::load(key, dir.path().to_path_buf()).unwrap();
    store.add(make_key("remove.example", b"user", &cred_id, 1_000)).unwrap();

    assert!(store.remove(&cred_id).unwrap());
    assert_eq!(store.credential_count(), 0);
    assert!(store.get_by_id(&cred_id).is_none());
    assert!(!store.remove(&cred_id).unwrap());

    let reloaded = KeyStore::load(key, dir.path().to_path_buf()).unwrap();
    assert_eq!(reloaded.credential_count(), 0);
}

#[test]
fn test_keystore_wrong_device_key_skips_file() {
    let dir = tempfile::tempdir().unwrap();
    let cred_id = [0x55u8; 32];

    let mut store = KeyStore::load([0x11; 32], dir.path().to_path_buf()).unwrap();
    store.add(make_key("wrong-key.example", b"user", &cred_id, 1_000)).unwrap();
    drop(store);

    let reloaded = KeyStore::load([0x22; 32], dir.path().to_path_buf()).unwrap();
    assert_eq!(reloaded.credential_count(), 0, "key sealed under another device key must be skipped");
}

#[test]
fn test_keystore_skips_garbage_and_foreign_files() {
    let dir = tempfile::tempdir().unwrap();
    let key = [0xCCu8; 32];
    let cred_id = [0x77u8; 32];

    let mut store = KeyStore::load(key, dir.path().to_path_buf()).unwrap();
    store.add(make_key("good.example", b"user", &cred_id, 2_000)).unwrap();
    drop(store);

    std::fs::write(dir.path().join("deadbeef.bin"), b"short").unwrap();
    std::fs::write(dir.path().join("garbage.bin"), b"not encrypted at all").unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"ignore me").unwrap();

    let reloaded = KeyStore::load(key, dir.path().to_path_buf()).unwrap();
    assert_eq!(reloaded.credential_count(), 1);
    assert!(reloaded.get_by_id(&cred_id).is_some());
}
