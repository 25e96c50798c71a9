//! Platform authenticator boundary.
//!
//! [`PlatformAuthenticator`] is the WebAuthn-style `create`/`get` pair the wallet
//! flow consumes. [`SoftwareAuthenticator`] implements it in-process with ES256
//! credentials held in a [`crate::keystore::KeyStore`].

pub mod attestation;
pub mod authenticator_data;
pub mod credential;
pub(crate) mod get_assertion;
pub(crate) mod make_credential;
pub mod options;
pub mod software;

pub use credential::{
    AssertionCredential, AssertionResponse, AttestationResponse, CollectedClientData,
    PublicKeyCredential,
};
pub use options::{
    AuthenticatorAttachment, AuthenticatorSelection, CreationOptions, CredentialParameters,
    RelyingParty, RequestOptions, UserEntity, UserVerificationRequirement,
};
pub use software::SoftwareAuthenticator;

use async_trait::async_trait;

pub const COSE_ALG_ES256: i64 = -7;
pub const COSE_ALG_RS256: i64 = -257;

/// Identifies credentials minted by [`SoftwareAuthenticator`].
pub const AAGUID: [u8; 16] = [
    0x70, 0x6b, 0x77, 0x6c, 0x2d, 0x73, 0x6f, 0x66, 0x74, 0x2d, 0x61, 0x75, 0x74, 0x68, 0x00, 0x01,
];

#[derive(Debug, thiserror::Error)]
pub enum AuthenticatorError {
    #[error("no platform authenticator available")]
    Unavailable,
    #[error("operation cancelled")]
    Cancelled,
    #[error("operation denied")]
    OperationDenied,
    #[error("user action timeout")]
    UserActionTimeout,
    #[error("unsupported algorithm")]
    UnsupportedAlgorithm,
    #[error("credential excluded")]
    CredentialExcluded,
    #[error("no credentials")]
    NoCredentials,
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("cbor: {0}")]
    Cbor(String),
    #[error("key store: {0}")]
    KeyStore(#[from] crate::keystore::KeyStoreError),
    #[error("{0}")]
    Internal(String),
}

#[async_trait]
pub trait PlatformAuthenticator: Send + Sync {
    /// Register a new credential (WebAuthn `navigator.credentials.create`).
    async fn create(&self, options: CreationOptions) -> Result<PublicKeyCredential, AuthenticatorError>;

    /// Prove possession of an existing credential (WebAuthn `navigator.credentials.get`).
    async fn get(&self, options: RequestOptions) -> Result<AssertionCredential, AuthenticatorError>;
}
