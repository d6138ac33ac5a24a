// Shared operation context.
//
// Built once at startup and passed to every operation as `Arc<AuthContext>`.
// The identity verifier is optional; federated sign-in is rejected with a
// validation error when it is absent.

use std::sync::Arc;

use credo_core::identity::IdentityVerifier;
use credo_core::notify::Notifier;
use credo_core::options::AuthOptions;
use credo_core::store::UserStore;

pub struct AuthContext {
    pub store: Arc<dyn UserStore>,
    pub notifier: Arc<dyn Notifier>,
    pub identity: Option<Arc<dyn IdentityVerifier>>,
    pub options: AuthOptions,
}

impl AuthContext {
    pub fn new(
        store: Arc<dyn UserStore>,
        notifier: Arc<dyn Notifier>,
        options: AuthOptions,
    ) -> Self {
        Self {
            store,
            notifier,
            identity: None,
            options,
        }
    }

    /// Enable federated sign-in with the given verifier.
    pub fn with_identity_verifier(mut self, verifier: Arc<dyn IdentityVerifier>) -> Self {
        self.identity = Some(verifier);
        self
    }
}
