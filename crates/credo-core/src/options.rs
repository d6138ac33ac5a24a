// Top-level configuration for the credential lifecycle.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::model::Role;

/// Environment variable holding the sealing/signing secret.
pub const SECRET_ENV: &str = "CREDO_SECRET";

/// Configuration shared by every operation.
///
/// The `secret` is the only required field and must come from the deploying
/// application, never from a literal in this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthOptions {
    /// Secret used to derive the OTP sealing key and sign session tokens.
    pub secret: String,

    /// Validity window for email verification codes, in minutes.
    #[serde(default = "default_verify_otp_minutes")]
    pub verify_otp_minutes: i64,

    /// Validity window for password reset codes, in minutes.
    #[serde(default = "default_reset_otp_minutes")]
    pub reset_otp_minutes: i64,

    /// Session token lifetime, in minutes.
    #[serde(default = "default_session_minutes")]
    pub session_minutes: i64,

    /// Minimum accepted password length.
    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,

    /// Role assigned to newly registered users.
    #[serde(default)]
    pub default_role: Role,
}

fn default_verify_otp_minutes() -> i64 {
    10
}

fn default_reset_otp_minutes() -> i64 {
    10
}

fn default_session_minutes() -> i64 {
    60
}

fn default_min_password_len() -> usize {
    8
}

impl AuthOptions {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            verify_otp_minutes: default_verify_otp_minutes(),
            reset_otp_minutes: default_reset_otp_minutes(),
            session_minutes: default_session_minutes(),
            min_password_len: default_min_password_len(),
            default_role: Role::default(),
        }
    }

    /// Builds options with the secret taken from [`SECRET_ENV`].
    pub fn from_env() -> Result<Self, AuthError> {
        let secret = std::env::var(SECRET_ENV)
            .map_err(|_| AuthError::Validation(format!("{SECRET_ENV} is not set")))?;
        if secret.trim().is_empty() {
            return Err(AuthError::Validation(format!("{SECRET_ENV} is empty")));
        }
        Ok(Self::new(secret))
    }

    pub fn verify_otp_ttl(&self) -> Duration {
        Duration::minutes(self.verify_otp_minutes)
    }

    pub fn reset_otp_ttl(&self) -> Duration {
        Duration::minutes(self.reset_otp_minutes)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::minutes(self.session_minutes)
    }
}
