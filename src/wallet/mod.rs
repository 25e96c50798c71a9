pub mod seal;

pub use seal::{EncryptedWallet, IV_LEN, create_encrypted_wallet, decrypt_wallet, open_json, seal_json};

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::codec::buffer_to_base64url;

/// JWK members that carry private key material.
const PRIVATE_MEMBERS: &[&str] = &["d", "p", "q", "dp", "dq", "qi", "oth", "k"];

/// An asymmetric keypair in JSON Web Key form. Opaque to this crate beyond its
/// `kty`; only ever held in memory.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wallet(Map<String, Value>);

impl Wallet {
    pub fn from_jwk(members: Map<String, Value>) -> Self {
        Self(members)
    }

    pub fn kty(&self) -> Option<&str> {
        self.0.get("kty").and_then(Value::as_str)
    }

    pub fn get(&self, member: &str) -> Option<&Value> {
        self.0.get(member)
    }

    /// The wallet with every private member stripped.
    pub fn public_jwk(&self) -> Wallet {
        let members = self
            .0
            .iter()
            .filter(|(k, _)| !PRIVATE_MEMBERS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Wallet(members)
    }

    pub fn as_jwk(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet").field("kty", &self.kty()).finish_non_exhaustive()
    }
}

/// Source of fresh wallets for the write path.
pub trait WalletGenerator: Send + Sync {
    fn generate(&self) -> Wallet;
}

/// Ed25519 keypairs as OKP JWKs (RFC 8037).
#[derive(Debug, Default, Clone, Copy)]
pub struct Ed25519WalletGenerator;

impl WalletGenerator for Ed25519WalletGenerator {
    fn generate(&self) -> Wallet {
        let signing = SigningKey::generate(&mut OsRng);
        let mut members = Map::new();
        members.insert("kty".into(), Value::String("OKP".into()));
        members.insert("crv".into(), Value::String("Ed25519".into()));
        members.insert(
            "x".into(),
            Value::String(buffer_to_base64url(signing.verifying_key().as_bytes())),
        );
        members.insert("d".into(), Value::String(buffer_to_base64url(signing.as_bytes())));
        Wallet(members)
    }
}
