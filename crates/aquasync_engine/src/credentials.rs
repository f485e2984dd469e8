//! Credential provider abstraction.
//!
//! Token acquisition and refresh live outside the engine; the engine
//! only asks for the current access token at the start of each pipeline
//! and fails fast with `AuthMissing` when none is available, before any
//! network traffic.

/// Supplies the current bearer token for sync requests.
pub trait CredentialProvider: Send + Sync {
    /// The current access token, or `None` when signed out.
    fn access_token(&self) -> Option<String>;
}

/// A fixed token, used in tests and simple deployments.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    token: Option<String>,
}

impl StaticCredentials {
    /// A provider that always returns the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// A provider with no token, simulating a signed-out device.
    pub fn signed_out() -> Self {
        Self { token: None }
    }
}

impl CredentialProvider for StaticCredentials {
    fn access_token(&self) -> Option<String> {
        self.token.clone()
    }
}
