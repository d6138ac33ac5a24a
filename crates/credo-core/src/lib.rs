// credo-core — shared vocabulary for the credential & OTP lifecycle.
//
// Holds the error taxonomy, the user record model, the collaborator traits
// (store, notifier, identity verifier), and configuration. The lifecycle
// operations themselves live in the `credo` crate.

pub mod error;
pub mod identity;
pub mod model;
pub mod notify;
pub mod options;
pub mod store;

// Re-exports for convenience
pub use error::{AuthError, Result};
pub use identity::{ExternalIdentity, IdentityVerifier};
pub use model::{NewUser, Role, SecretChange, StoredOtp, UserPatch, UserRecord};
pub use notify::{Notification, Notifier};
pub use options::AuthOptions;
pub use store::UserStore;
