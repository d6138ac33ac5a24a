// Email/password sign-in.

use std::sync::Arc;

use serde::Serialize;

use credo_core::error::{AuthError, Result};
use credo_core::model::UserRecord;

use crate::context::AuthContext;
use crate::password;
use crate::token;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub token: String,
    pub user: UserRecord,
}

/// Authenticate and mint a stateless session token.
///
/// Unknown email, soft-deleted record, a federated-only account with no
/// password, and a wrong password all collapse to `InvalidCredentials`; the
/// miss paths burn a hash verification so they take comparable time to a
/// real comparison. Valid credentials with an unverified email get the
/// distinct `EmailNotVerified`.
pub async fn login(ctx: &Arc<AuthContext>, email: &str, pass: &str) -> Result<SignInResponse> {
    let email = crate::validate::normalize_email(email);
    let user = match ctx.store.find_by_email_with_secrets(&email).await? {
        Some(u) if !u.is_deleted => u,
        _ => {
            password::burn_verification(pass);
            return Err(AuthError::InvalidCredentials);
        }
    };

    let hash = match &user.password_hash {
        Some(h) => h,
        None => {
            password::burn_verification(pass);
            return Err(AuthError::InvalidCredentials);
        }
    };

    if !password::verify_password(hash, pass)? {
        return Err(AuthError::InvalidCredentials);
    }

    if !user.email_verified {
        return Err(AuthError::EmailNotVerified);
    }

    let token = token::sign_session(&ctx.options.secret, &user.id, ctx.options.session_ttl())?;
    Ok(SignInResponse {
        token,
        user: user.without_secrets(),
    })
}
