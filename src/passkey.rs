//! Registration and assertion ceremonies against a [`PlatformAuthenticator`],
//! mapped onto the wallet flow's error kinds.

use rand::RngCore;
use rand::rngs::OsRng;

use crate::authenticator::{
    AssertionCredential, AuthenticatorAttachment, AuthenticatorError, AuthenticatorSelection,
    COSE_ALG_ES256, COSE_ALG_RS256, CreationOptions, CredentialParameters, PlatformAuthenticator,
    PublicKeyCredential, RelyingParty, RequestOptions, UserEntity, UserVerificationRequirement,
};
use crate::codec::base64url_to_buffer;
use crate::error::{Error, Result};

pub const CHALLENGE_LEN: usize = 32;

fn challenge() -> Vec<u8> {
    let mut challenge = vec![0u8; CHALLENGE_LEN];
    OsRng.fill_bytes(&mut challenge);
    challenge
}

/// Registration options for `user_identity` scoped to `rp_id`.
pub fn creation_options(rp_id: &str, user_identity: &str) -> CreationOptions {
    CreationOptions {
        challenge: challenge(),
        rp: RelyingParty {
            id: rp_id.to_string(),
            name: None,
        },
        user: UserEntity {
            id: user_identity.as_bytes().to_vec(),
            name: user_identity.to_string(),
            display_name: user_identity.to_string(),
        },
        pub_key_cred_params: vec![
            CredentialParameters { alg: COSE_ALG_ES256 },
            CredentialParameters { alg: COSE_ALG_RS256 },
        ],
        authenticator_selection: AuthenticatorSelection {
            authenticator_attachment: Some(AuthenticatorAttachment::Platform),
            user_verification: UserVerificationRequirement::Required,
        },
        exclude_credentials: Vec::new(),
    }
}

/// Create a platform credential bound to `user_identity`.
pub async fn create_credential(
    authenticator: &dyn PlatformAuthenticator,
    rp_id: &str,
    user_identity: &str,
) -> Result<PublicKeyCredential> {
    if user_identity.is_empty() {
        return Err(Error::InvalidInput("user identity must not be empty".into()));
    }
    let options = creation_options(rp_id, user_identity);
    let credential = authenticator.create(options).await.map_err(|e| {
        tracing::warn!(error = %e, "Credential creation failed");
        match e {
            AuthenticatorError::Unavailable | AuthenticatorError::Cancelled => {
                Error::AuthenticatorUnavailable
            }
            AuthenticatorError::OperationDenied | AuthenticatorError::UserActionTimeout => {
                Error::UserVerificationFailed
            }
            AuthenticatorError::InvalidOptions(msg) => Error::InvalidInput(msg),
            other => Error::Authenticator(other),
        }
    })?;
    tracing::info!(cred_id = %credential.id, "Credential created");
    Ok(credential)
}

/// Re-prove possession of the credential whose base64url id was stored at setup.
pub async fn assert_credential(
    authenticator: &dyn PlatformAuthenticator,
    rp_id: &str,
    stored_credential_id: &str,
) -> Result<AssertionCredential> {
    let raw_id = base64url_to_buffer(stored_credential_id)
        .map_err(|e| Error::MalformedRecord(format!("credential id: {e}")))?;
    if raw_id.is_empty() {
        return Err(Error::MalformedRecord("credential id is empty".into()));
    }

    let options = RequestOptions {
        challenge: challenge(),
        rp_id: rp_id.to_string(),
        allow_credentials: vec![raw_id.clone()],
        user_verification: UserVerificationRequirement::Required,
    };
    let assertion = authenticator.get(options).await.map_err(|e| {
        tracing::warn!(error = %e, "Assertion failed");
        match e {
            AuthenticatorError::Cancelled
            | AuthenticatorError::OperationDenied
            | AuthenticatorError::UserActionTimeout => Error::AssertionCancelled,
            AuthenticatorError::NoCredentials => {
                Error::AssertionFailed("no matching credential on this device".into())
            }
            AuthenticatorError::Unavailable => Error::AuthenticatorUnavailable,
            other => Error::AssertionFailed(other.to_string()),
        }
    })?;

    // Key derivation uses the id string, so it must be the one stored at setup.
    if assertion.raw_id != raw_id {
        return Err(Error::AssertionFailed("authenticator answered with a different credential".into()));
    }
    tracing::info!(cred_id = %assertion.id, "Credential asserted");
    Ok(assertion)
}
