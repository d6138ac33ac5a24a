// Federated identity verification.
//
// A verifier turns an opaque provider token into a proven identity. Token
// formats are provider-specific, so the trait owns validation entirely and
// the lifecycle only sees the result.

use async_trait::async_trait;

use crate::error::AuthError;

/// Proven claims returned by an [`IdentityVerifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    /// Provider-scoped stable subject identifier.
    pub external_id: String,
    pub email: String,
    /// Whether the provider itself attests the email address.
    pub email_verified: bool,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Validates provider tokens for federated sign-in.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verifies `token` and returns the claims it proves.
    ///
    /// Implementations must return [`AuthError::InvalidExternalToken`] for
    /// anything that fails signature, audience, or expiry checks.
    async fn verify(&self, token: &str) -> Result<ExternalIdentity, AuthError>;
}
