use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

pub const RESIDENT_KEY_VERSION: u8 = 1;

#[derive(Clone, Serialize, Deserialize)]
pub struct ResidentKey {
    pub version:       u8,
    pub credential_id: Vec<u8>,     // 32 bytes random
    pub rp_id:         String,
    pub rp_id_hash:    Vec<u8>,     // SHA-256(rp_id)
    pub rp_name:       Option<String>,
    pub user_id:       Vec<u8>,
    pub user_name:     String,
    pub user_display:  String,
    pub public_key_x:  Vec<u8>,     // P-256 x
    pub public_key_y:  Vec<u8>,     // P-256 y
    pub private_key:   Vec<u8>,     // P-256 scalar, big-endian
    pub sign_count:    u32,
    pub created_at:    u64,         // ms since epoch
    pub discoverable:  bool,
}

impl ResidentKey {
    pub(crate) fn id_array(&self) -> Option<[u8; 32]> {
        self.credential_id.as_slice().try_into().ok()
    }

    pub(crate) fn rp_array(&self) -> Option<[u8; 32]> {
        self.rp_id_hash.as_slice().try_into().ok()
    }
}

impl std::fmt::Debug for ResidentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResidentKey")
            .field("credential_id", &crate::codec::to_hex(&self.credential_id))
            .field("rp_id", &self.rp_id)
            .field("user_name", &self.user_name)
            .field("sign_count", &self.sign_count)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

impl Drop for ResidentKey {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}
