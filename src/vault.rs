use std::sync::Arc;

use crate::authenticator::PlatformAuthenticator;
use crate::error::{Error, Result};
use crate::kdf::derive_key;
use crate::passkey::{assert_credential, create_credential};
use crate::records::{CredentialRecord, RecordStore};
use crate::wallet::{Ed25519WalletGenerator, Wallet, WalletGenerator, create_encrypted_wallet, decrypt_wallet};

/// Where a session stands on the read path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletState {
    /// Not yet looked up.
    Unknown,
    NoCredentialFound,
    CredentialStored,
    KeyDerived,
    WalletAvailable,
    /// The last assertion failed; retry the unlock or set up a new wallet.
    AssertionFailed,
}

/// One user's wallet session. Construct at sign-in, drop (or [`sign_out`](Self::sign_out))
/// at sign-out.
pub struct WalletVault {
    authenticator: Arc<dyn PlatformAuthenticator>,
    records: Arc<dyn RecordStore>,
    generator: Arc<dyn WalletGenerator>,
    rp_id: String,
    state: WalletState,
    wallet: Option<Wallet>,
}

impl WalletVault {
    pub fn new(
        authenticator: Arc<dyn PlatformAuthenticator>,
        records: Arc<dyn RecordStore>,
        rp_id: impl Into<String>,
    ) -> Self {
        Self {
            authenticator,
            records,
            generator: Arc::new(Ed25519WalletGenerator),
            rp_id: rp_id.into(),
            state: WalletState::Unknown,
            wallet: None,
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn WalletGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn state(&self) -> WalletState {
        self.state
    }

    pub fn wallet(&self) -> Option<&Wallet> {
        self.wallet.as_ref()
    }

    /// Look up the stored record and reset the state from it. Any open wallet is
    /// dropped when no record remains.
    pub async fn refresh(&mut self) -> Result<Option<CredentialRecord>> {
        let record = self.records.get_my_credential().await?;
        if record.is_some() {
            if self.wallet.is_none() {
                self.state = WalletState::CredentialStored;
            }
        } else {
            self.wallet = None;
            self.state = WalletState::NoCredentialFound;
        }
        Ok(record)
    }

    /// Create a passkey and a fresh wallet sealed under it, replacing any previous
    /// record. Nothing is written unless every step succeeds.
    pub async fn setup(&mut self, user_identity: &str) -> Result<&Wallet> {
        let credential = create_credential(self.authenticator.as_ref(), &self.rp_id, user_identity).await?;
        let public_key = credential.public_key().map_err(Error::Authenticator)?;
        let key = derive_key(&credential).await?;
        let (wallet, encrypted_wallet) = create_encrypted_wallet(&key, self.generator.as_ref())?;

        let record = CredentialRecord {
            credential_id: credential.id.clone(),
            public_key,
            created_at: now_millis(),
            encrypted_wallet,
        };
        self.records.create_user_credential(record).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to store credential record");
            Error::from(e)
        })?;
        tracing::info!(cred_id = %credential.id, "Wallet created");

        self.state = WalletState::WalletAvailable;
        Ok(self.wallet.insert(wallet))
    }

    /// Assert the stored passkey, re-derive the key and open the stored wallet.
    /// The previously open wallet is dropped first, so a failed unlock leaves none.
    pub async fn unlock(&mut self) -> Result<&Wallet> {
        self.sign_out();
        let Some(record) = self.refresh().await? else {
            return Err(Error::NoCredentialFound);
        };

        let assertion = match assert_credential(
            self.authenticator.as_ref(),
            &self.rp_id,
            &record.credential_id,
        )
        .await
        {
            Ok(a) => a,
            Err(e) => {
                self.state = WalletState::AssertionFailed;
                return Err(e);
            }
        };

        let key = derive_key(&assertion).await?;
        self.state = WalletState::KeyDerived;

        let wallet = match decrypt_wallet(&record.encrypted_wallet, &key) {
            Ok(w) => w,
            Err(e) => {
                tracing::warn!(cred_id = %record.credential_id, error = %e, "Stored wallet could not be opened");
                self.state = WalletState::CredentialStored;
                return Err(e);
            }
        };
        self.state = WalletState::WalletAvailable;
        tracing::info!(cred_id = %record.credential_id, "Wallet unlocked");
        Ok(self.wallet.insert(wallet))
    }

    /// Drop the in-memory wallet. The stored record is untouched.
    pub fn sign_out(&mut self) {
        self.wallet = None;
        if matches!(self.state, WalletState::WalletAvailable | WalletState::KeyDerived) {
            self.state = WalletState::CredentialStored;
        }
    }
}

fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
