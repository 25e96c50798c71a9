use ciborium::value::Value;

use super::{AuthenticatorError, COSE_ALG_ES256};

/// Build a "packed" self-attestation object (WebAuthn text-keyed form).
pub(crate) fn build_attestation_object(
    auth_data: &[u8],
    der_sig: &[u8],
) -> Result<Vec<u8>, AuthenticatorError> {
    let map = Value::Map(vec![
        (Value::Text("fmt".to_string()), Value::Text("packed".to_string())),
        (
            Value::Text("attStmt".to_string()),
            Value::Map(vec![
                (Value::Text("alg".to_string()), Value::Integer(COSE_ALG_ES256.into())),
                (Value::Text("sig".to_string()), Value::Bytes(der_sig.to_vec())),
            ]),
        ),
        (Value::Text("authData".to_string()), Value::Bytes(auth_data.to_vec())),
    ]);
    let mut buf = Vec::new();
    ciborium::into_writer(&map, &mut buf).map_err(|e| AuthenticatorError::Cbor(e.to_string()))?;
    Ok(buf)
}

/// Attestation format and raw authenticator data extracted from an attestation object.
#[derive(Debug, Clone)]
pub struct AttestationObject {
    pub fmt: String,
    pub auth_data: Vec<u8>,
}

pub fn parse_attestation_object(bytes: &[u8]) -> Result<AttestationObject, AuthenticatorError> {
    let value: Value =
        ciborium::from_reader(bytes).map_err(|e| AuthenticatorError::Cbor(e.to_string()))?;
    let Value::Map(map) = value else {
        return Err(AuthenticatorError::Cbor("expected map".into()));
    };
    let field = |name: &str| {
        map.iter()
            .find(|(k, _)| matches!(k, Value::Text(s) if s == name))
            .map(|(_, v)| v)
    };

    let fmt = match field("fmt") {
        Some(Value::Text(s)) => s.clone(),
        _ => return Err(AuthenticatorError::Malformed("attestation object missing fmt".into())),
    };
    let auth_data = match field("authData") {
        Some(Value::Bytes(b)) => b.clone(),
        _ => return Err(AuthenticatorError::Malformed("attestation object missing authData".into())),
    };
    Ok(AttestationObject { fmt, auth_data })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attestation_object_roundtrip() {
        let auth_data = vec![0x42u8; 40];
        let bytes = build_attestation_object(&auth_data, &[0x30, 0x00]).unwrap();
        let parsed = parse_attestation_object(&bytes).unwrap();
        assert_eq!(parsed.fmt, "packed");
        assert_eq!(parsed.auth_data, auth_data);
    }

    #[test]
    fn test_missing_auth_data() {
        let map = Value::Map(vec![(Value::Text("fmt".into()), Value::Text("none".into()))]);
        let mut buf = Vec::new();
        ciborium::into_writer(&map, &mut buf).unwrap();
        let err = parse_attestation_object(&buf).unwrap_err();
        assert!(matches!(err, AuthenticatorError::Malformed(_)));
    }

    #[test]
    fn test_not_a_map() {
        let mut buf = Vec::new();
        ciborium::into_writer(&Value::Array(vec![]), &mut buf).unwrap();
        assert!(matches!(
            parse_attestation_object(&buf).unwrap_err(),
            AuthenticatorError::Cbor(_)
        ));
    }
}
