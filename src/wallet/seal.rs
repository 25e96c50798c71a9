use aes_gcm::Nonce;
use aes_gcm::aead::Aead;
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{Wallet, WalletGenerator};
use crate::error::{Error, Result};
use crate::kdf::SymmetricKey;

pub const IV_LEN: usize = 12;

/// AES-GCM output as stored in a credential record. Both fields serialize as
/// plain number arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedWallet {
    pub iv: Vec<u8>,
    /// Ciphertext followed by the 16-byte authentication tag.
    pub data: Vec<u8>,
}

/// Serialize `value` as JSON and encrypt it under `key` with a fresh random IV.
pub fn seal_json<T: Serialize + ?Sized>(key: &SymmetricKey, value: &T) -> Result<EncryptedWallet> {
    let plaintext = Zeroizing::new(
        serde_json::to_vec(value).map_err(|e| Error::Serialization(e.to_string()))?,
    );

    let mut iv = [0u8; IV_LEN];
    rand::rngs::OsRng.fill_bytes(&mut iv);

    let data = key
        .cipher()
        .encrypt(Nonce::from_slice(&iv), plaintext.as_slice())
        .map_err(|_| {
            tracing::error!("AES-GCM encryption rejected key or IV");
            Error::EncryptionFailed
        })?;

    Ok(EncryptedWallet { iv: iv.to_vec(), data })
}

/// Decrypt `sealed` under `key` and parse the plaintext as JSON.
pub fn open_json<T: DeserializeOwned>(sealed: &EncryptedWallet, key: &SymmetricKey) -> Result<T> {
    if sealed.iv.len() != IV_LEN {
        return Err(Error::MalformedRecord(format!(
            "iv must be {IV_LEN} bytes, got {}",
            sealed.iv.len()
        )));
    }

    let plaintext = Zeroizing::new(
        key.cipher()
            .decrypt(Nonce::from_slice(&sealed.iv), sealed.data.as_slice())
            .map_err(|_| Error::DecryptionFailed)?,
    );

    serde_json::from_slice(&plaintext).map_err(|e| Error::Serialization(e.to_string()))
}

/// Generate a new wallet and seal it under `key`. The plaintext wallet is returned
/// for immediate use only.
pub fn create_encrypted_wallet(
    key: &SymmetricKey,
    generator: &dyn WalletGenerator,
) -> Result<(Wallet, EncryptedWallet)> {
    let wallet = generator.generate();
    let sealed = seal_json(key, &wallet)?;
    tracing::debug!(kty = wallet.kty().unwrap_or("?"), len = sealed.data.len(), "Wallet sealed");
    Ok((wallet, sealed))
}

pub fn decrypt_wallet(sealed: &EncryptedWallet, key: &SymmetricKey) -> Result<Wallet> {
    open_json(sealed, key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sealed_layout() {
        let key = SymmetricKey::derive("cred-layout").unwrap();
        let sealed = seal_json(&key, &serde_json::json!({"kty": "EC"})).unwrap();
        assert_eq!(sealed.iv.len(), IV_LEN);
        // {"kty":"EC"} is 12 bytes, plus the 16-byte tag
        assert_eq!(sealed.data.len(), 12 + 16);
    }

    #[test]
    fn test_serializes_as_number_arrays() {
        let sealed = EncryptedWallet { iv: vec![1, 2, 3], data: vec![255] };
        let json = serde_json::to_string(&sealed).unwrap();
        assert_eq!(json, r#"{"iv":[1,2,3],"data":[255]}"#);
    }

    #[test]
    fn test_short_iv_is_malformed() {
        let key = SymmetricKey::derive("cred-short-iv").unwrap();
        let mut sealed = seal_json(&key, &serde_json::json!({"kty": "EC"})).unwrap();
        sealed.iv.truncate(8);
        let err = open_json::<serde_json::Value>(&sealed, &key).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord(_)));
    }

    #[test]
    fn test_authentic_non_object_plaintext_is_serialization_error() {
        let key = SymmetricKey::derive("cred-array").unwrap();
        let sealed = seal_json(&key, &[1, 2, 3]).unwrap();
        let err = decrypt_wallet(&sealed, &key).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
