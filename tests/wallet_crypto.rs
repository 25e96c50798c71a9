use std::collections::HashSet;

use passkey_wallet::wallet::{
    Ed25519WalletGenerator, EncryptedWallet, IV_LEN, Wallet, create_encrypted_wallet,
    decrypt_wallet, seal_json,
};
use passkey_wallet::{Error, SymmetricKey, derive_key};
use serde_json::json;

fn sample_wallet() -> serde_json::Value {
    json!({"kty": "EC", "test": true})
}

#[tokio::test]
async fn test_same_id_derives_interchangeable_keys() {
    let a = derive_key("cred-abc123").await.unwrap();
    let b = derive_key("cred-abc123").await.unwrap();

    let sealed = seal_json(&a, &sample_wallet()).unwrap();
    let wallet = decrypt_wallet(&sealed, &b).unwrap();
    assert_eq!(wallet.kty(), Some("EC"));
    assert_eq!(wallet.get("test"), Some(&json!(true)));
}

#[tokio::test]
async fn test_different_id_fails_to_decrypt() {
    let a = derive_key("cred-abc123").await.unwrap();
    let other = derive_key("cred-xyz999").await.unwrap();

    let sealed = seal_json(&a, &sample_wallet()).unwrap();
    assert!(matches!(decrypt_wallet(&sealed, &other), Err(Error::DecryptionFailed)));
}

#[tokio::test]
async fn test_empty_credential_id_is_rejected() {
    assert!(matches!(derive_key("").await, Err(Error::InvalidInput(_))));
}

#[test]
fn test_sealed_layout() {
    let key = SymmetricKey::derive("cred-abc123").unwrap();
    let plaintext = serde_json::to_vec(&sample_wallet()).unwrap();
    let sealed = seal_json(&key, &sample_wallet()).unwrap();
    assert_eq!(sealed.iv.len(), IV_LEN);
    // ciphertext || 16-byte tag
    assert_eq!(sealed.data.len(), plaintext.len() + 16);
}

#[test]
fn test_every_bit_flip_is_detected() {
    let key = SymmetricKey::derive("cred-abc123").unwrap();
    let sealed = seal_json(&key, &sample_wallet()).unwrap();

    for field in ["iv", "data"] {
        let len = if field == "iv" { sealed.iv.len() } else { sealed.data.len() };
        for byte in 0..len {
            for bit in 0..8 {
                let mut tampered = sealed.clone();
                let target = if field == "iv" { &mut tampered.iv } else { &mut tampered.data };
                target[byte] ^= 1 << bit;
                assert!(
                    matches!(decrypt_wallet(&tampered, &key), Err(Error::DecryptionFailed)),
                    "flip of {field}[{byte}] bit {bit} went undetected"
                );
            }
        }
    }
}

#[test]
fn test_truncated_data_is_detected() {
    let key = SymmetricKey::derive("cred-abc123").unwrap();
    let mut sealed = seal_json(&key, &sample_wallet()).unwrap();
    sealed.data.pop();
    assert!(matches!(decrypt_wallet(&sealed, &key), Err(Error::DecryptionFailed)));

    let empty = EncryptedWallet { iv: sealed.iv.clone(), data: Vec::new() };
    assert!(matches!(decrypt_wallet(&empty, &key), Err(Error::DecryptionFailed)));
}

#[test]
fn test_wrong_iv_length_is_malformed() {
    let key = SymmetricKey::derive("cred-abc123").unwrap();
    let mut sealed = seal_json(&key, &sample_wallet()).unwrap();
    sealed.iv.push(0);
    assert!(matches!(decrypt_wallet(&sealed, &key), Err(Error::MalformedRecord(_))));
}

#[test]
fn test_ivs_are_unique() {
    let key = SymmetricKey::derive("cred-abc123").unwrap();
    let mut seen = HashSet::new();
    for _ in 0..10_000 {
        let sealed = seal_json(&key, &sample_wallet()).unwrap();
        assert!(seen.insert(sealed.iv), "IV reused");
    }
}

#[test]
fn test_sealing_twice_gives_different_ciphertexts() {
    let key = SymmetricKey::derive("cred-abc123").unwrap();
    let a = seal_json(&key, &sample_wallet()).unwrap();
    let b = seal_json(&key, &sample_wallet()).unwrap();
    assert_ne!(a.data, b.data);
    assert_eq!(decrypt_wallet(&a, &key).unwrap(), decrypt_wallet(&b, &key).unwrap());
}

#[test]
fn test_generated_wallet_roundtrip() {
    let key = SymmetricKey::derive("cred-generated").unwrap();
    let (wallet, sealed) = create_encrypted_wallet(&key, &Ed25519WalletGenerator).unwrap();
    let opened: Wallet = decrypt_wallet(&sealed, &key).unwrap();
    assert_eq!(opened, wallet);
    assert_eq!(opened.kty(), Some("OKP"));
    assert!(opened.get("d").is_some());
    assert!(opened.public_jwk().get("d").is_none());
}

#[test]
fn test_encrypted_wallet_json_survives_storage() {
    let key = SymmetricKey::derive("cred-json").unwrap();
    let sealed = seal_json(&key, &sample_wallet()).unwrap();
    let stored = serde_json::to_string(&sealed).unwrap();
    let restored: EncryptedWallet = serde_json::from_str(&stored).unwrap();
    assert_eq!(restored, sealed);
    assert!(decrypt_wallet(&restored, &key).is_ok());
}
