// Lifecycle operations, one module per group.
//
// All operations are short-lived request/response transactions over
// `Arc<AuthContext>`. Verify and resend racing on the same record is
// last-writer-wins; expired codes are rejected lazily at use, never swept.

pub mod admin;
pub mod federated;
pub mod login;
pub mod register;
pub mod reset;

pub use admin::{change_role, restore, soft_delete};
pub use federated::federated_sign_in;
pub use login::{login, SignInResponse};
pub use register::{register, resend_verification, verify_email};
pub use reset::{request_password_reset, reset_password};

use chrono::{Duration, Utc};
use tracing::warn;

use credo_core::error::Result;
use credo_core::model::StoredOtp;
use credo_core::notify::{Notification, Notifier};

use crate::otp;

/// Generate a fresh code and its sealed stored form.
///
/// Returns the plaintext (for the notification only, never persisted) and
/// the `StoredOtp` to install.
pub(crate) fn issue_otp(secret: &str, ttl: Duration) -> Result<(String, StoredOtp)> {
    let code = otp::generate_code();
    let sealed = otp::seal(secret, &code)?;
    Ok((
        code,
        StoredOtp {
            sealed,
            expires_at: Utc::now() + ttl,
        },
    ))
}

/// Send a notification, logging failure instead of propagating it.
///
/// Persisted OTP state stands regardless of delivery outcome; the user can
/// always request a resend.
pub(crate) async fn notify_best_effort(notifier: &dyn Notifier, message: Notification) {
    let to = message.to.clone();
    if let Err(e) = notifier.send(message).await {
        warn!(to = %to, error = %e, "notification delivery failed");
    }
}
