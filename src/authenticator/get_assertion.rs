use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey};
use sha2::{Digest, Sha256};
use std::sync::Mutex;

use super::authenticator_data::build_get_assertion_auth_data;
use super::{
    AssertionCredential, AssertionResponse, AuthenticatorError, CollectedClientData, RequestOptions,
};
use crate::codec::{buffer_to_base64url, to_hex};
use crate::keystore::{KeyStore, ResidentKey};
use crate::up::{UserVerifier, get_assertion_prompt};

fn lock(keys: &Mutex<KeyStore>) -> Result<std::sync::MutexGuard<'_, KeyStore>, AuthenticatorError> {
    keys.lock()
        .map_err(|_| AuthenticatorError::Internal("key store lock poisoned".into()))
}

pub(crate) async fn handle_get_assertion(
    options: RequestOptions,
    keys: &Mutex<KeyStore>,
    verifier: &dyn UserVerifier,
) -> Result<AssertionCredential, AuthenticatorError> {
    let rp_id_hash: [u8; 32] = Sha256::digest(options.rp_id.as_bytes()).into();

    // Find credential
    let cred: ResidentKey = {
        let guard = lock(keys)?;
        let found = if !options.allow_credentials.is_empty() {
            options.allow_credentials.iter().find_map(|id| {
                guard
                    .get_by_id(id)
                    .filter(|c| c.rp_id_hash.as_slice() == rp_id_hash.as_slice())
            })
        } else {
            guard.get_by_rp_hash(&rp_id_hash).into_iter().next()
        };
        match found {
            Some(c) => c.clone(),
            None => return Err(AuthenticatorError::NoCredentials),
        }
    };

    // User verification
    let prompt = get_assertion_prompt(&options.rp_id, &cred.user_display);
    let _proof = verifier.verify(&prompt).await?;
    tracing::info!(cred_id = to_hex(&cred.credential_id), "User verified for assertion");

    let sign_count = lock(keys)?.increment_sign_count(&cred.credential_id)?;

    let client_data = CollectedClientData {
        kind: "webauthn.get".to_string(),
        challenge: buffer_to_base64url(&options.challenge),
        origin: format!("https://{}", options.rp_id),
        cross_origin: false,
    };
    let client_data_json = serde_json::to_vec(&client_data)
        .map_err(|e| AuthenticatorError::Internal(e.to_string()))?;

    let authenticator_data = build_get_assertion_auth_data(&rp_id_hash, sign_count);
    let mut to_sign = authenticator_data.clone();
    to_sign.extend_from_slice(&Sha256::digest(&client_data_json));

    let signing_key = SigningKey::from_slice(&cred.private_key)
        .map_err(|_| AuthenticatorError::Internal("stored private key is invalid".into()))?;
    let signature: Signature = signing_key.sign(&to_sign);

    // user.id is returned for discoverable credentials
    let user_handle = cred.discoverable.then(|| cred.user_id.clone());

    Ok(AssertionCredential::new(
        cred.credential_id.clone(),
        AssertionResponse {
            client_data_json,
            authenticator_data,
            signature: signature.to_der().as_bytes().to_vec(),
            user_handle,
        },
    ))
}
