// Error taxonomy for the credential lifecycle.
//
// Every failure is recoverable at the component boundary — nothing here is
// fatal to the process. Public Display strings are safe to hand to a caller:
// they never disclose whether an email exists (beyond what the operation
// contract already reveals) or any crypto internals. The detailed cause goes
// to `tracing` at the site where it is collapsed.

use serde::{Deserialize, Serialize};

/// Unified result type for lifecycle operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Lifecycle failure taxonomy.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    /// Malformed or missing input (username/password/email policy, bad role,
    /// disabled capability).
    #[error("{0}")]
    Validation(String),

    /// Email already bound to an existing, non-deleted record.
    #[error("Email is already in use")]
    DuplicateEmail,

    /// No record for the given identifier.
    #[error("User not found")]
    NotFound,

    /// No outstanding OTP, or the outstanding OTP has expired.
    #[error("OTP is missing or has expired. Please request a new one")]
    ExpiredOrMissingOtp,

    /// Submitted code does not match the outstanding OTP. The OTP stays
    /// valid for further attempts until it expires.
    #[error("Invalid OTP. Please try again")]
    InvalidOtp,

    /// Deliberately collapsed: unknown email, soft-deleted record, missing
    /// password, or wrong password all surface as this one error to prevent
    /// account enumeration.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Credentials are valid but the email was never verified. Distinct from
    /// `InvalidCredentials` since it is not a secrecy-sensitive signal.
    #[error("Email not verified. Please verify your email to log in")]
    EmailNotVerified,

    /// Identity-provider token failed verification for any reason (expired,
    /// bad signature, audience mismatch). Causes are not surfaced.
    #[error("Invalid identity token")]
    InvalidExternalToken,

    /// Sealed OTP blob could not be decoded. Internal only — operations map
    /// this to `ExpiredOrMissingOtp` before returning to the caller.
    #[error("Failed to decode sealed value: {0}")]
    Decode(String),

    /// Administrative action attempted without permission. Enforcement is
    /// the caller's responsibility; the variant exists so the controller
    /// layer has a single error type to map.
    #[error("Unauthorized")]
    Unauthorized,

    /// User-record store failure.
    #[error("Storage error: {0}")]
    Store(String),

    /// Notification delivery failure. Operations log this and carry on;
    /// persisted OTP state stands regardless.
    #[error("Notification error: {0}")]
    Notify(String),

    /// Hashing or cipher failure.
    #[error("Crypto error: {0}")]
    Crypto(String),
}

impl AuthError {
    /// Stable machine-readable code, suitable for a controller layer to map
    /// onto transport-level responses.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::Validation,
            Self::DuplicateEmail => ErrorCode::DuplicateEmail,
            Self::NotFound => ErrorCode::NotFound,
            Self::ExpiredOrMissingOtp => ErrorCode::ExpiredOrMissingOtp,
            Self::InvalidOtp => ErrorCode::InvalidOtp,
            Self::InvalidCredentials => ErrorCode::InvalidCredentials,
            Self::EmailNotVerified => ErrorCode::EmailNotVerified,
            Self::InvalidExternalToken => ErrorCode::InvalidExternalToken,
            Self::Decode(_) => ErrorCode::ExpiredOrMissingOtp,
            Self::Unauthorized => ErrorCode::Unauthorized,
            Self::Store(_) | Self::Notify(_) | Self::Crypto(_) => ErrorCode::Internal,
        }
    }
}

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Validation,
    DuplicateEmail,
    NotFound,
    ExpiredOrMissingOtp,
    InvalidOtp,
    InvalidCredentials,
    EmailNotVerified,
    InvalidExternalToken,
    Unauthorized,
    Internal,
}
