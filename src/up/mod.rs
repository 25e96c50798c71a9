//! User verification for the software authenticator.

pub(crate) mod pinentry;
pub(crate) mod prompt;

pub use pinentry::{AlwaysApprove, PinentryVerifier, UserPresenceProof, UserVerifier};
pub use prompt::UvPrompt;
pub(crate) use prompt::{get_assertion_prompt, make_credential_prompt};
