use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::get_assertion::handle_get_assertion;
use super::make_credential::handle_make_credential;
use super::{
    AssertionCredential, AuthenticatorError, CreationOptions, PlatformAuthenticator,
    PublicKeyCredential, RequestOptions,
};
use crate::keystore::KeyStore;
use crate::up::UserVerifier;

/// In-process platform authenticator: ES256 resident keys, packed self-attestation,
/// user verification delegated to a [`UserVerifier`].
#[derive(Clone)]
pub struct SoftwareAuthenticator {
    keys: Arc<Mutex<KeyStore>>,
    verifier: Arc<dyn UserVerifier>,
}

impl SoftwareAuthenticator {
    pub fn new(keys: KeyStore, verifier: Arc<dyn UserVerifier>) -> Self {
        Self {
            keys: Arc::new(Mutex::new(keys)),
            verifier,
        }
    }

    /// Keys vanish when the authenticator is dropped.
    pub fn ephemeral(verifier: Arc<dyn UserVerifier>) -> Self {
        Self::new(KeyStore::in_memory(), verifier)
    }

    pub fn credential_count(&self) -> usize {
        self.keys.lock().map(|k| k.credential_count()).unwrap_or(0)
    }

    /// Forget a credential, as a user would from the OS passkey manager.
    pub fn remove_credential(&self, raw_id: &[u8]) -> Result<bool, AuthenticatorError> {
        let mut keys = self
            .keys
            .lock()
            .map_err(|_| AuthenticatorError::Internal("key store lock poisoned".into()))?;
        Ok(keys.remove(raw_id)?)
    }
}

#[async_trait]
impl PlatformAuthenticator for SoftwareAuthenticator {
    async fn create(&self, options: CreationOptions) -> Result<PublicKeyCredential, AuthenticatorError> {
        handle_make_credential(options, &self.keys, self.verifier.as_ref()).await
    }

    async fn get(&self, options: RequestOptions) -> Result<AssertionCredential, AuthenticatorError> {
        handle_get_assertion(options, &self.keys, self.verifier.as_ref()).await
    }
}
