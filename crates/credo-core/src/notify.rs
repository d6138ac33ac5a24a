// Notification sender trait.
//
// The lifecycle awaits `send` so failures propagate, but treats them as a
// non-fatal warning: OTP state is persisted regardless of delivery outcome.

use async_trait::async_trait;

use crate::error::AuthError;

/// An outbound message carrying a plaintext one-time code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Email (or other channel) delivery collaborator.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: Notification) -> Result<(), AuthError>;
}
