// credo — credential & OTP lifecycle manager.
//
// Sits between an HTTP controller layer and a user-record store plus a
// notification sender, both consumed through the traits in `credo-core`.
// Operations are free functions over an `Arc<AuthContext>`.

pub mod context;
pub mod ops;
pub mod otp;
pub mod password;
pub mod telemetry;
pub mod token;
pub mod validate;

pub use context::AuthContext;
pub use credo_core::{
    AuthError, AuthOptions, ExternalIdentity, IdentityVerifier, NewUser, Notification, Notifier,
    Result, Role, SecretChange, StoredOtp, UserPatch, UserRecord, UserStore,
};
pub use token::SessionClaims;
