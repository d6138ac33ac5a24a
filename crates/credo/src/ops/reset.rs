// Password reset, a two-step OTP flow on its own clock.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

use credo_core::error::{AuthError, Result};
use credo_core::model::{SecretChange, UserPatch};
use credo_core::notify::Notification;

use crate::context::AuthContext;
use crate::ops::{issue_otp, notify_best_effort};
use crate::otp;
use crate::password::{constant_time_equal, hash_password};
use crate::validate;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

/// Email a password-reset code.
///
/// Unknown emails get `NotFound` here, unlike login's collapsed error. That
/// asymmetry discloses account existence through this endpoint; it matches
/// the established external contract and is kept deliberately.
pub async fn request_password_reset(ctx: &Arc<AuthContext>, email: &str) -> Result<()> {
    let email = validate::normalize_email(email);
    let user = ctx
        .store
        .find_by_email(&email)
        .await?
        .ok_or(AuthError::NotFound)?;

    let (code, stored) = issue_otp(&ctx.options.secret, ctx.options.reset_otp_ttl())?;
    let patch = UserPatch {
        password_reset_otp: Some(SecretChange::Set(stored)),
        ..Default::default()
    };
    ctx.store
        .update(&user.id, patch)
        .await?
        .ok_or(AuthError::NotFound)?;

    notify_best_effort(
        ctx.notifier.as_ref(),
        Notification {
            to: email,
            subject: "Reset your password".into(),
            body: format!(
                "Your password reset code is {code}. It expires in {} minutes.",
                ctx.options.reset_otp_minutes
            ),
        },
    )
    .await;

    Ok(())
}

/// Confirm a reset code and install a new password.
///
/// A matching code clears the reset pair; a mismatch leaves it valid for
/// retry until expiry. The verification pair is untouched either way.
pub async fn reset_password(ctx: &Arc<AuthContext>, req: ResetPasswordRequest) -> Result<()> {
    validate::validate_password(&req.new_password, ctx.options.min_password_len)?;

    let email = validate::normalize_email(&req.email);
    let user = ctx
        .store
        .find_by_email_with_secrets(&email)
        .await?
        .ok_or(AuthError::NotFound)?;

    let pair = user
        .password_reset_otp
        .as_ref()
        .ok_or(AuthError::ExpiredOrMissingOtp)?;
    if pair.is_expired(Utc::now()) {
        return Err(AuthError::ExpiredOrMissingOtp);
    }

    let expected = match otp::open(&ctx.options.secret, &pair.sealed) {
        Ok(plain) => plain,
        Err(e) => {
            debug!(error = %e, "stored reset code failed to decode");
            return Err(AuthError::ExpiredOrMissingOtp);
        }
    };

    if !constant_time_equal(expected.as_bytes(), req.code.as_bytes()) {
        return Err(AuthError::InvalidOtp);
    }

    let patch = UserPatch {
        password_hash: Some(hash_password(&req.new_password)?),
        password_reset_otp: Some(SecretChange::Clear),
        ..Default::default()
    };
    ctx.store
        .update(&user.id, patch)
        .await?
        .ok_or(AuthError::NotFound)?;

    Ok(())
}
