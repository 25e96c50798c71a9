use serde::{Deserialize, Serialize};

use super::attestation::parse_attestation_object;
use super::authenticator_data::parse_authenticator_data;
use super::{AuthenticatorAttachment, AuthenticatorError};
use crate::codec::buffer_to_base64url;
use crate::kdf::CredentialMaterial;

/// WebAuthn `CollectedClientData`, serialized as `clientDataJSON`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedClientData {
    #[serde(rename = "type")]
    pub kind: String,
    pub challenge: String,
    pub origin: String,
    #[serde(default)]
    pub cross_origin: bool,
}

impl CollectedClientData {
    pub fn parse(json: &[u8]) -> Result<Self, AuthenticatorError> {
        serde_json::from_slice(json).map_err(|e| AuthenticatorError::Malformed(e.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct AttestationResponse {
    pub client_data_json: Vec<u8>,
    pub attestation_object: Vec<u8>,
}

/// Result of a registration ceremony.
#[derive(Debug, Clone)]
pub struct PublicKeyCredential {
    /// base64url(raw_id), no padding.
    pub id: String,
    pub raw_id: Vec<u8>,
    pub response: AttestationResponse,
    pub authenticator_attachment: AuthenticatorAttachment,
}

impl PublicKeyCredential {
    pub fn new(
        raw_id: Vec<u8>,
        response: AttestationResponse,
        authenticator_attachment: AuthenticatorAttachment,
    ) -> Self {
        Self {
            id: buffer_to_base64url(&raw_id),
            raw_id,
            response,
            authenticator_attachment,
        }
    }

    /// The credential public key as base64url-encoded COSE_Key bytes.
    pub fn public_key(&self) -> Result<String, AuthenticatorError> {
        let attestation = parse_attestation_object(&self.response.attestation_object)?;
        let auth_data = parse_authenticator_data(&attestation.auth_data)?;
        let attested = auth_data.attested.ok_or_else(|| {
            AuthenticatorError::Malformed("registration response has no attested credential".into())
        })?;
        if attested.credential_id != self.raw_id {
            return Err(AuthenticatorError::Malformed(
                "attested credential id does not match raw id".into(),
            ));
        }
        Ok(buffer_to_base64url(&attested.cose_key))
    }
}

impl CredentialMaterial for PublicKeyCredential {
    fn credential_id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone)]
pub struct AssertionResponse {
    pub client_data_json: Vec<u8>,
    pub authenticator_data: Vec<u8>,
    /// DER-encoded ECDSA signature over `authenticator_data || SHA-256(client_data_json)`.
    pub signature: Vec<u8>,
    pub user_handle: Option<Vec<u8>>,
}

/// Result of an authentication ceremony.
#[derive(Debug, Clone)]
pub struct AssertionCredential {
    pub id: String,
    pub raw_id: Vec<u8>,
    pub response: AssertionResponse,
}

impl AssertionCredential {
    pub fn new(raw_id: Vec<u8>, response: AssertionResponse) -> Self {
        Self {
            id: buffer_to_base64url(&raw_id),
            raw_id,
            response,
        }
    }
}

impl CredentialMaterial for AssertionCredential {
    fn credential_id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_data_json_field_names() {
        let data = CollectedClientData {
            kind: "webauthn.get".into(),
            challenge: "abc".into(),
            origin: "https://example.com".into(),
            cross_origin: false,
        };
        let json = serde_json::to_string(&data).unwrap();
        assert_eq!(
            json,
            r#"{"type":"webauthn.get","challenge":"abc","origin":"https://example.com","crossOrigin":false}"#
        );
        assert_eq!(CollectedClientData::parse(json.as_bytes()).unwrap(), data);
    }

    #[test]
    fn test_id_is_base64url_of_raw_id() {
        let cred = AssertionCredential::new(
            vec![0xfb, 0xff],
            AssertionResponse {
                client_data_json: vec![],
                authenticator_data: vec![],
                signature: vec![],
                user_handle: None,
            },
        );
        assert_eq!(cred.id, "-_8");
        assert_eq!(cred.credential_id(), "-_8");
    }
}
