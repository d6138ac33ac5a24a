// Test doubles for the notifier and identity verifier seams.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use credo_core::error::AuthError;
use credo_core::identity::{ExternalIdentity, IdentityVerifier};
use credo_core::notify::{Notification, Notifier};

/// Notifier that records every message instead of sending it.
///
/// Can be switched into a failing mode to exercise the warn-and-continue
/// delivery path.
#[derive(Debug, Clone, Default)]
pub struct CaptureNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
    fail: Arc<Mutex<bool>>,
}

impl CaptureNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.lock().await.clone()
    }

    /// The most recent message, if any.
    pub async fn last(&self) -> Option<Notification> {
        self.sent.lock().await.last().cloned()
    }

    /// Extract the 6-digit code from the most recent message body.
    pub async fn last_code(&self) -> Option<String> {
        let body = self.last().await?.body;
        body.split(|c: char| !c.is_ascii_digit())
            .find(|chunk| chunk.len() == 6)
            .map(str::to_owned)
    }

    pub async fn set_failing(&self, fail: bool) {
        *self.fail.lock().await = fail;
    }
}

#[async_trait]
impl Notifier for CaptureNotifier {
    async fn send(&self, message: Notification) -> Result<(), AuthError> {
        if *self.fail.lock().await {
            return Err(AuthError::Notify("smtp unavailable".into()));
        }
        self.sent.lock().await.push(message);
        Ok(())
    }
}

/// Verifier that accepts a fixed set of (token, identity) pairs and rejects
/// everything else with `InvalidExternalToken`.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityVerifier {
    accepted: Vec<(String, ExternalIdentity)>,
}

impl StaticIdentityVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(mut self, token: impl Into<String>, identity: ExternalIdentity) -> Self {
        self.accepted.push((token.into(), identity));
        self
    }
}

#[async_trait]
impl IdentityVerifier for StaticIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<ExternalIdentity, AuthError> {
        self.accepted
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, id)| id.clone())
            .ok_or(AuthError::InvalidExternalToken)
    }
}
