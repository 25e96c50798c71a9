use async_trait::async_trait;
use std::time::Duration;

use super::prompt::UvPrompt;
use crate::authenticator::AuthenticatorError;

pub const DEFAULT_UV_TIMEOUT: Duration = Duration::from_secs(30);

/// Evidence that the user approved an operation. Key material is only
/// generated or used while holding one.
#[derive(Debug)]
pub struct UserPresenceProof {
    pub(crate) _private: (),
}

impl UserPresenceProof {
    /// Construct a proof for use in tests only.
    /// Do not use in production code: this bypasses user verification.
    #[doc(hidden)]
    pub fn test_only() -> Self {
        Self { _private: () }
    }
}

#[async_trait]
pub trait UserVerifier: Send + Sync {
    async fn verify(&self, prompt: &UvPrompt) -> Result<UserPresenceProof, AuthenticatorError>;
}

/// Confirms every request without asking. For headless use (`--assume-yes`).
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysApprove;

#[async_trait]
impl UserVerifier for AlwaysApprove {
    async fn verify(&self, prompt: &UvPrompt) -> Result<UserPresenceProof, AuthenticatorError> {
        tracing::debug!(title = %prompt.title, "User verification auto-approved");
        Ok(UserPresenceProof { _private: () })
    }
}

/// Asks the user through a pinentry dialog.
#[derive(Debug, Clone)]
pub struct PinentryVerifier {
    bin: String,
    timeout: Duration,
}

impl PinentryVerifier {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into(), timeout: DEFAULT_UV_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl UserVerifier for PinentryVerifier {
    async fn verify(&self, prompt: &UvPrompt) -> Result<UserPresenceProof, AuthenticatorError> {
        let title = prompt.title.clone();
        let description = prompt.description.clone();
        let bin = self.bin.clone();

        let join = tokio::task::spawn_blocking(move || {
            let Some(mut input) = pinentry::PassphraseInput::with_binary(&bin) else {
                return Err(AuthenticatorError::Unavailable);
            };
            input
                .with_title(&title)
                .with_description(&description)
                .with_ok("Confirm")
                .with_cancel("Deny")
                .interact()
                .map(|_| ())
                .map_err(|e| {
                    tracing::debug!(error = %e, "pinentry declined");
                    AuthenticatorError::OperationDenied
                })
        });

        match tokio::time::timeout(self.timeout, join).await {
            Err(_) => Err(AuthenticatorError::UserActionTimeout),
            Ok(Err(e)) => Err(AuthenticatorError::Internal(format!("pinentry task: {e}"))),
            Ok(Ok(Err(e))) => Err(e),
            Ok(Ok(Ok(()))) => Ok(UserPresenceProof { _private: () }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_approve() {
        let prompt = super::super::prompt::get_assertion_prompt("example.com", "alice");
        assert!(AlwaysApprove.verify(&prompt).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_pinentry_binary_is_unavailable() {
        let verifier = PinentryVerifier::new("/nonexistent/pinentry-for-tests");
        let prompt = super::super::prompt::get_assertion_prompt("example.com", "alice");
        let err = verifier.verify(&prompt).await.unwrap_err();
        assert!(matches!(err, AuthenticatorError::Unavailable));
    }
}
