//! Symmetric key derivation from a passkey credential identifier.
//!
//! The identifier string is the only key material: the salt is fixed at sixteen
//! zero bytes so that a key re-derived from a later assertion opens wallets sealed
//! at registration time. Changing any parameter here orphans every stored wallet.

use aes_gcm::{Aes256Gcm, KeyInit};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::{Error, Result};

pub const PBKDF2_ITERATIONS: u32 = 100_000;
pub const PBKDF2_SALT: [u8; 16] = [0u8; 16];
pub const KEY_LEN: usize = 32;

/// Anything exposing the base64url credential identifier a key is derived from.
pub trait CredentialMaterial {
    fn credential_id(&self) -> &str;
}

impl CredentialMaterial for str {
    fn credential_id(&self) -> &str {
        self
    }
}

impl CredentialMaterial for String {
    fn credential_id(&self) -> &str {
        self
    }
}

/// AES-256-GCM key usable only for encrypt/decrypt. The raw bytes never leave
/// this type.
#[derive(Clone)]
pub struct SymmetricKey {
    cipher: Aes256Gcm,
}

impl SymmetricKey {
    /// Blocking derivation; prefer [`derive_key`] from async code.
    pub fn derive<C: CredentialMaterial + ?Sized>(credential: &C) -> Result<Self> {
        let id = credential.credential_id();
        if id.is_empty() {
            return Err(Error::InvalidInput("empty credential id".into()));
        }
        let mut raw = Zeroizing::new([0u8; KEY_LEN]);
        pbkdf2_hmac::<Sha256>(id.as_bytes(), &PBKDF2_SALT, PBKDF2_ITERATIONS, raw.as_mut());
        let cipher = Aes256Gcm::new_from_slice(raw.as_ref())
            .map_err(|e| Error::Internal(format!("key import: {e}")))?;
        Ok(Self { cipher })
    }

    pub(crate) fn cipher(&self) -> &Aes256Gcm {
        &self.cipher
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey(..)")
    }
}

/// Derive the wallet key for `credential` on the blocking pool.
pub async fn derive_key<C: CredentialMaterial + ?Sized>(credential: &C) -> Result<SymmetricKey> {
    let id = credential.credential_id().to_string();
    tokio::task::spawn_blocking(move || SymmetricKey::derive(id.as_str()))
        .await
        .map_err(|e| Error::Internal(format!("key derivation task: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    // PBKDF2-HMAC-SHA256 output must not drift: stored wallets depend on it.
    #[test]
    fn test_pbkdf2_parameters_are_stable() {
        let mut a = [0u8; KEY_LEN];
        let mut b = [0u8; KEY_LEN];
        pbkdf2_hmac::<Sha256>(b"cred-abc123", &PBKDF2_SALT, PBKDF2_ITERATIONS, &mut a);
        pbkdf2_hmac::<Sha256>(b"cred-abc123", &[0u8; 16], 100_000, &mut b);
        assert_eq!(a, b);
        assert_ne!(a, [0u8; KEY_LEN]);
    }

    #[test]
    fn test_empty_id_rejected() {
        let err = SymmetricKey::derive("").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_debug_hides_key() {
        let key = SymmetricKey::derive("cred-abc123").unwrap();
        assert_eq!(format!("{key:?}"), "SymmetricKey(..)");
    }
}
