#[derive(Debug, Clone)]
pub struct UvPrompt {
    pub title: String,
    pub description: String,
}

pub(crate) fn make_credential_prompt(rp_id: &str, rp_name: Option<&str>, user_display: &str) -> UvPrompt {
    let site = match rp_name {
        Some(name) => format!("{name} ({rp_id})"),
        None => rp_id.to_string(),
    };
    UvPrompt {
        title: "passkey-wallet".to_string(),
        description: format!("Create wallet passkey\n\nSite: {site}\nAccount: {user_display}\n\nPress OK to create, or Cancel to deny."),
    }
}

pub(crate) fn get_assertion_prompt(rp_id: &str, user_display: &str) -> UvPrompt {
    UvPrompt {
        title: "passkey-wallet".to_string(),
        description: format!("Unlock wallet\n\nSite: {rp_id}\nAccount: {user_display}\n\nPress OK to unlock, or Cancel to deny."),
    }
}
