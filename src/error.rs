use crate::authenticator::AuthenticatorError;
use crate::records::RecordStoreError;

/// Failure kinds surfaced to the caller. Each kind maps to a distinct user-facing
/// outcome, so the read path never conflates "no wallet" with "wallet cannot be opened".
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no platform authenticator available")]
    AuthenticatorUnavailable,
    #[error("user verification failed")]
    UserVerificationFailed,
    #[error("assertion cancelled")]
    AssertionCancelled,
    #[error("assertion failed: {0}")]
    AssertionFailed(String),
    #[error("wallet decryption failed")]
    DecryptionFailed,
    #[error("wallet encryption failed")]
    EncryptionFailed,
    #[error("record store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("record store rejected write: {0}")]
    StoreRejected(String),
    #[error("no credential record found")]
    NoCredentialFound,
    #[error("malformed credential record: {0}")]
    MalformedRecord(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("serialization: {0}")]
    Serialization(String),
    #[error("authenticator: {0}")]
    Authenticator(AuthenticatorError),
    #[error("{0}")]
    Internal(String),
}

impl From<RecordStoreError> for Error {
    fn from(e: RecordStoreError) -> Self {
        match e {
            RecordStoreError::Rejected(msg) => Error::StoreRejected(msg),
            other => Error::StoreUnavailable(other.to_string()),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
