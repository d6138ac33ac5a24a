// Registration and email verification.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

use credo_core::error::{AuthError, Result};
use credo_core::model::{NewUser, SecretChange, UserPatch, UserRecord};
use credo_core::notify::Notification;

use crate::context::AuthContext;
use crate::ops::{issue_otp, notify_best_effort};
use crate::otp;
use crate::password::{constant_time_equal, hash_password};
use crate::validate;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Create an unverified account and email it a verification code.
///
/// The account starts with `email_verified = false` and cannot log in until
/// the code is confirmed. The plaintext code exists only in the outbound
/// notification.
pub async fn register(ctx: &Arc<AuthContext>, req: RegisterRequest) -> Result<UserRecord> {
    let username = req.username.trim().to_owned();
    validate::validate_username(&username)?;

    let email = validate::normalize_email(&req.email);
    validate::validate_email(&email)?;
    validate::validate_password(&req.password, ctx.options.min_password_len)?;

    if ctx.store.exists_by_email(&email).await? {
        return Err(AuthError::DuplicateEmail);
    }

    let password_hash = hash_password(&req.password)?;
    let (code, stored) = issue_otp(&ctx.options.secret, ctx.options.verify_otp_ttl())?;

    let mut user = NewUser::local(username, email.clone(), password_hash);
    user.email_otp = Some(stored);
    user.role = ctx.options.default_role;
    let record = ctx.store.create(user).await?;

    notify_best_effort(
        ctx.notifier.as_ref(),
        verification_message(&email, &code, ctx.options.verify_otp_minutes),
    )
    .await;

    Ok(record)
}

/// Confirm an emailed verification code.
///
/// A matching code marks the email verified and clears the outstanding pair.
/// A mismatch leaves the pair in place so the user can retry until expiry.
pub async fn verify_email(ctx: &Arc<AuthContext>, email: &str, code: &str) -> Result<UserRecord> {
    let email = validate::normalize_email(email);
    let user = ctx
        .store
        .find_by_email_with_secrets(&email)
        .await?
        .ok_or(AuthError::NotFound)?;

    let pair = user.email_otp.as_ref().ok_or(AuthError::ExpiredOrMissingOtp)?;
    if pair.is_expired(Utc::now()) {
        return Err(AuthError::ExpiredOrMissingOtp);
    }

    let expected = match otp::open(&ctx.options.secret, &pair.sealed) {
        Ok(plain) => plain,
        Err(e) => {
            debug!(error = %e, "stored verification code failed to decode");
            return Err(AuthError::ExpiredOrMissingOtp);
        }
    };

    if !constant_time_equal(expected.as_bytes(), code.as_bytes()) {
        return Err(AuthError::InvalidOtp);
    }

    let patch = UserPatch {
        email_verified: Some(true),
        email_otp: Some(SecretChange::Clear),
        ..Default::default()
    };
    ctx.store
        .update(&user.id, patch)
        .await?
        .ok_or(AuthError::NotFound)
}

/// Issue a fresh verification code, invalidating any outstanding one.
///
/// Allowed regardless of the current verified state.
pub async fn resend_verification(ctx: &Arc<AuthContext>, email: &str) -> Result<()> {
    let email = validate::normalize_email(email);
    let user = ctx
        .store
        .find_by_email(&email)
        .await?
        .ok_or(AuthError::NotFound)?;

    let (code, stored) = issue_otp(&ctx.options.secret, ctx.options.verify_otp_ttl())?;
    let patch = UserPatch {
        email_otp: Some(SecretChange::Set(stored)),
        ..Default::default()
    };
    ctx.store
        .update(&user.id, patch)
        .await?
        .ok_or(AuthError::NotFound)?;

    notify_best_effort(
        ctx.notifier.as_ref(),
        verification_message(&email, &code, ctx.options.verify_otp_minutes),
    )
    .await;

    Ok(())
}

fn verification_message(to: &str, code: &str, minutes: i64) -> Notification {
    Notification {
        to: to.to_owned(),
        subject: "Verify your email".into(),
        body: format!("Your verification code is {code}. It expires in {minutes} minutes."),
    }
}
