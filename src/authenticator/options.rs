#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticatorAttachment {
    Platform,
    CrossPlatform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserVerificationRequirement {
    #[default]
    Required,
    Preferred,
    Discouraged,
}

#[derive(Debug, Clone)]
pub struct RelyingParty {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UserEntity {
    pub id: Vec<u8>,
    pub name: String,
    pub display_name: String,
}

/// One entry of `pubKeyCredParams`; the type is always `public-key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialParameters {
    pub alg: i64,
}

#[derive(Debug, Clone, Default)]
pub struct AuthenticatorSelection {
    pub authenticator_attachment: Option<AuthenticatorAttachment>,
    pub user_verification: UserVerificationRequirement,
}

#[derive(Debug, Clone)]
pub struct CreationOptions {
    pub challenge: Vec<u8>,
    pub rp: RelyingParty,
    pub user: UserEntity,
    pub pub_key_cred_params: Vec<CredentialParameters>,
    pub authenticator_selection: AuthenticatorSelection,
    /// Raw ids the authenticator must refuse to re-register.
    pub exclude_credentials: Vec<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub challenge: Vec<u8>,
    pub rp_id: String,
    /// Raw ids acceptable for this assertion; empty means discoverable lookup.
    pub allow_credentials: Vec<Vec<u8>>,
    pub user_verification: UserVerificationRequirement,
}
