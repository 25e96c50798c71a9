use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use rand::Rng;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use std::sync::Mutex;

use super::attestation::build_attestation_object;
use super::authenticator_data::build_make_cred_auth_data;
use super::{
    AttestationResponse, AuthenticatorAttachment, AuthenticatorError, COSE_ALG_ES256,
    CollectedClientData, CreationOptions, PublicKeyCredential,
};
use crate::codec::{buffer_to_base64url, to_hex};
use crate::keystore::resident::RESIDENT_KEY_VERSION;
use crate::keystore::{KeyStore, ResidentKey};
use crate::up::{UserVerifier, make_credential_prompt};

/// WebAuthn caps user handles at 64 bytes.
const MAX_USER_ID_LEN: usize = 64;

pub(crate) async fn handle_make_credential(
    options: CreationOptions,
    keys: &Mutex<KeyStore>,
    verifier: &dyn UserVerifier,
) -> Result<PublicKeyCredential, AuthenticatorError> {
    // 1. This authenticator is always platform-attached
    if options.authenticator_selection.authenticator_attachment
        == Some(AuthenticatorAttachment::CrossPlatform)
    {
        return Err(AuthenticatorError::Unavailable);
    }

    // 2. Validate request
    if !options.pub_key_cred_params.iter().any(|p| p.alg == COSE_ALG_ES256) {
        return Err(AuthenticatorError::UnsupportedAlgorithm);
    }
    if options.rp.id.is_empty() {
        return Err(AuthenticatorError::InvalidOptions("empty rp id".into()));
    }
    if options.user.id.is_empty() || options.user.id.len() > MAX_USER_ID_LEN {
        return Err(AuthenticatorError::InvalidOptions(format!(
            "user id must be 1..={MAX_USER_ID_LEN} bytes, got {}",
            options.user.id.len()
        )));
    }

    // 3. Compute rp_id_hash and check excludeCredentials
    let rp_id_hash: [u8; 32] = Sha256::digest(options.rp.id.as_bytes()).into();
    {
        let guard = keys
            .lock()
            .map_err(|_| AuthenticatorError::Internal("key store lock poisoned".into()))?;
        let excluded = options.exclude_credentials.iter().any(|id| {
            guard
                .get_by_id(id)
                .is_some_and(|k| k.rp_id_hash.as_slice() == rp_id_hash.as_slice())
        });
        if excluded {
            return Err(AuthenticatorError::CredentialExcluded);
        }
    }

    // 4. User verification
    let prompt = make_credential_prompt(
        &options.rp.id,
        options.rp.name.as_deref(),
        &options.user.display_name,
    );
    let _proof = verifier.verify(&prompt).await?;
    tracing::info!(rp_id = %options.rp.id, "User verified for registration");

    // 5. Generate credential ID and key
    let cred_id: [u8; 32] = rand::thread_rng().r#gen();
    let signing_key = SigningKey::random(&mut OsRng);
    let point = signing_key.verifying_key().to_encoded_point(false);
    let (Some(x), Some(y)) = (point.x(), point.y()) else {
        return Err(AuthenticatorError::Internal("uncompressed point lacks coordinates".into()));
    };
    let x = <[u8; 32]>::try_from(x.as_slice())
        .map_err(|_| AuthenticatorError::Internal("bad x coordinate length".into()))?;
    let y = <[u8; 32]>::try_from(y.as_slice())
        .map_err(|_| AuthenticatorError::Internal("bad y coordinate length".into()))?;

    // 6. Client data, authenticator data, packed self-attestation
    let client_data = CollectedClientData {
        kind: "webauthn.create".to_string(),
        challenge: buffer_to_base64url(&options.challenge),
        origin: format!("https://{}", options.rp.id),
        cross_origin: false,
    };
    let client_data_json = serde_json::to_vec(&client_data)
        .map_err(|e| AuthenticatorError::Internal(e.to_string()))?;
    let client_data_hash = Sha256::digest(&client_data_json);

    let auth_data = build_make_cred_auth_data(&rp_id_hash, &cred_id, &x, &y);
    let mut to_sign = auth_data.clone();
    to_sign.extend_from_slice(&client_data_hash);
    let signature: Signature = signing_key.sign(&to_sign);
    let attestation_object = build_attestation_object(&auth_data, signature.to_der().as_bytes())?;

    // 7. Store resident key
    let created_at = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;

    let record = ResidentKey {
        version: RESIDENT_KEY_VERSION,
        credential_id: cred_id.to_vec(),
        rp_id: options.rp.id,
        rp_id_hash: rp_id_hash.to_vec(),
        rp_name: options.rp.name,
        user_id: options.user.id,
        user_name: options.user.name,
        user_display: options.user.display_name,
        public_key_x: x.to_vec(),
        public_key_y: y.to_vec(),
        private_key: signing_key.to_bytes().to_vec(),
        sign_count: 0,
        created_at,
        discoverable: true,
    };

    keys.lock()
        .map_err(|_| AuthenticatorError::Internal("key store lock poisoned".into()))?
        .add(record)?;
    tracing::info!(cred_id = to_hex(&cred_id), "Resident key stored");

    Ok(PublicKeyCredential::new(
        cred_id.to_vec(),
        AttestationResponse { client_data_json, attestation_object },
        AuthenticatorAttachment::Platform,
    ))
}
