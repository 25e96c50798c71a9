//! Resident credential keys for [`crate::authenticator::SoftwareAuthenticator`].

pub mod disk;
pub mod index;
pub mod resident;

pub use index::KeyStore;
pub use resident::ResidentKey;

#[derive(Debug, thiserror::Error)]
pub enum KeyStoreError {
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialize: {0}")]
    Serialization(String),
    #[error("Encrypt: {0}")]
    Encryption(String),
    #[error("Corrupt: {0}")]
    Corrupt(String),
    #[error("Not found")]
    NotFound,
}
