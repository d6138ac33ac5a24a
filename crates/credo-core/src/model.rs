// User record model.
//
// Secrets (password hash, sealed OTPs) are "hidden" fields: the store strips
// them from default reads and serialization always skips them. An OTP and its
// expiry travel together as one `StoredOtp` value, so the both-set-or-both-
// absent invariant holds by construction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Closed role set. Default is the lowest privilege.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Moderator,
    Admin,
}

impl Role {
    /// Parse a role name, rejecting anything outside the closed set.
    pub fn parse(s: &str) -> Result<Self, AuthError> {
        match s {
            "user" => Ok(Self::User),
            "moderator" => Ok(Self::Moderator),
            "admin" => Ok(Self::Admin),
            other => Err(AuthError::Validation(format!(
                "Invalid role '{other}'. Allowed roles are: user, moderator, admin"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
        }
    }
}

/// A sealed one-time code and its expiry, stored and cleared as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredOtp {
    /// Sealed blob (`hex(nonce):hex(ciphertext)`); the plaintext code is
    /// never persisted.
    pub sealed: String,
    pub expires_at: DateTime<Utc>,
}

impl StoredOtp {
    /// Whether the code is past its expiry. Strictly after: a code checked at
    /// exactly `expires_at` is still valid.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// One registered identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub email: String,
    /// Hidden. `None` for federated-only accounts, and on default reads.
    #[serde(skip)]
    pub password_hash: Option<String>,
    pub email_verified: bool,
    /// Hidden. Outstanding email-verification OTP, if any.
    #[serde(skip)]
    pub email_otp: Option<StoredOtp>,
    /// Hidden. Outstanding password-reset OTP; independent lifecycle from
    /// the verification pair.
    #[serde(skip)]
    pub password_reset_otp: Option<StoredOtp>,
    pub role: Role,
    pub is_deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Copy with all hidden fields stripped, as returned by default reads.
    pub fn without_secrets(mut self) -> Self {
        self.password_hash = None;
        self.email_otp = None;
        self.password_reset_otp = None;
        self
    }
}

/// Input to `UserStore::create`. The store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub email_verified: bool,
    pub email_otp: Option<StoredOtp>,
    pub role: Role,
    pub external_id: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl NewUser {
    /// Local-credential signup: unverified, default role, no federation.
    pub fn local(username: String, email: String, password_hash: String) -> Self {
        Self {
            username,
            email,
            password_hash: Some(password_hash),
            email_verified: false,
            email_otp: None,
            role: Role::default(),
            external_id: None,
            display_name: None,
            avatar_url: None,
        }
    }
}

/// Change to a secret pair: install a fresh value or clear it. There is no
/// way to set a code without its expiry, or clear one half.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretChange {
    Set(StoredOtp),
    Clear,
}

impl SecretChange {
    /// The resulting stored value.
    pub fn apply(self) -> Option<StoredOtp> {
        match self {
            Self::Set(otp) => Some(otp),
            Self::Clear => None,
        }
    }
}

/// Partial update for `UserStore::update`. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub email_verified: Option<bool>,
    pub email_otp: Option<SecretChange>,
    pub password_reset_otp: Option<SecretChange>,
    pub role: Option<Role>,
    pub is_deleted: Option<bool>,
    pub external_id: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password_hash.is_none()
            && self.email_verified.is_none()
            && self.email_otp.is_none()
            && self.password_reset_otp.is_none()
            && self.role.is_none()
            && self.is_deleted.is_none()
            && self.external_id.is_none()
            && self.display_name.is_none()
            && self.avatar_url.is_none()
    }
}
