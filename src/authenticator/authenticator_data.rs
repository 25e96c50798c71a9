use ciborium::value::Value;

use super::{AAGUID, AuthenticatorError, COSE_ALG_ES256};

pub const FLAG_UP: u8 = 0x01;
pub const FLAG_UV: u8 = 0x04;
pub const FLAG_AT: u8 = 0x40;
pub const FLAG_ED: u8 = 0x80;

/// rpIdHash (32) + flags (1) + signCount (4)
const HEADER_LEN: usize = 37;

/// Attested credential data carried by registration authenticator data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestedCredential {
    pub aaguid: [u8; 16],
    pub credential_id: Vec<u8>,
    /// CBOR-encoded COSE_Key, exactly as emitted by the authenticator.
    pub cose_key: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAuthenticatorData {
    pub rp_id_hash: [u8; 32],
    pub flags: u8,
    pub sign_count: u32,
    pub attested: Option<AttestedCredential>,
}

/// Registration authenticator data: UP+UV+AT, signCount 0, attested credential.
pub(crate) fn build_make_cred_auth_data(
    rp_id_hash: &[u8; 32],
    credential_id: &[u8],
    public_key_x: &[u8; 32],
    public_key_y: &[u8; 32],
) -> Vec<u8> {
    let cose_key = encode_cose_key(public_key_x, public_key_y);
    let cred_id_len = credential_id.len() as u16;
    let mut data = Vec::with_capacity(HEADER_LEN + 18 + credential_id.len() + cose_key.len());
    data.extend_from_slice(rp_id_hash);
    data.push(FLAG_UP | FLAG_UV | FLAG_AT);
    data.extend_from_slice(&0u32.to_be_bytes());
    data.extend_from_slice(&AAGUID);
    data.extend_from_slice(&cred_id_len.to_be_bytes());
    data.extend_from_slice(credential_id);
    data.extend_from_slice(&cose_key);
    data
}

/// Assertion authenticator data: UP+UV, no attested credential.
pub(crate) fn build_get_assertion_auth_data(rp_id_hash: &[u8; 32], sign_count: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity(HEADER_LEN);
    data.extend_from_slice(rp_id_hash);
    data.push(FLAG_UP | FLAG_UV);
    data.extend_from_slice(&sign_count.to_be_bytes());
    data
}

/// P-256 public key as a COSE_Key map (kty=2, alg=-7, crv=1, x, y).
pub(crate) fn encode_cose_key(x: &[u8; 32], y: &[u8; 32]) -> Vec<u8> {
    let map = Value::Map(vec![
        (Value::Integer(1i64.into()), Value::Integer(2i64.into())),
        (Value::Integer(3i64.into()), Value::Integer(COSE_ALG_ES256.into())),
        (Value::Integer((-1i64).into()), Value::Integer(1i64.into())),
        (Value::Integer((-2i64).into()), Value::Bytes(x.to_vec())),
        (Value::Integer((-3i64).into()), Value::Bytes(y.to_vec())),
    ]);
    let mut buf = Vec::new();
    // Writing a fixed map of ints and byte strings into a Vec cannot fail.
    let _ = ciborium::into_writer(&map, &mut buf);
    buf
}

/// Parse authenticator data, including attested credential data when AT is set.
pub fn parse_authenticator_data(data: &[u8]) -> Result<ParsedAuthenticatorData, AuthenticatorError> {
    if data.len() < HEADER_LEN {
        return Err(AuthenticatorError::Malformed(format!(
            "authenticator data is {} bytes, need at least {HEADER_LEN}",
            data.len()
        )));
    }
    let mut rp_id_hash = [0u8; 32];
    rp_id_hash.copy_from_slice(&data[..32]);
    let flags = data[32];
    let sign_count = u32::from_be_bytes([data[33], data[34], data[35], data[36]]);

    let attested = if flags & FLAG_AT != 0 {
        Some(parse_attested_credential(&data[HEADER_LEN..])?)
    } else {
        None
    };

    Ok(ParsedAuthenticatorData { rp_id_hash, flags, sign_count, attested })
}

fn parse_attested_credential(rest: &[u8]) -> Result<AttestedCredential, AuthenticatorError> {
    if rest.len() < 18 {
        return Err(AuthenticatorError::Malformed("attested credential data truncated".into()));
    }
    let mut aaguid = [0u8; 16];
    aaguid.copy_from_slice(&rest[..16]);
    let id_len = u16::from_be_bytes([rest[16], rest[17]]) as usize;
    let rest = &rest[18..];
    if rest.len() < id_len {
        return Err(AuthenticatorError::Malformed("credential id truncated".into()));
    }
    let (credential_id, key_and_ext) = rest.split_at(id_len);

    // The COSE key is one CBOR item; anything after it belongs to extensions.
    let mut cursor = key_and_ext;
    let _: Value = ciborium::from_reader(&mut cursor)
        .map_err(|e| AuthenticatorError::Cbor(e.to_string()))?;
    let key_len = key_and_ext.len() - cursor.len();

    Ok(AttestedCredential {
        aaguid,
        credential_id: credential_id.to_vec(),
        cose_key: key_and_ext[..key_len].to_vec(),
    })
}
