// Federated sign-in via an identity provider token.

use std::sync::Arc;

use credo_core::error::{AuthError, Result};
use credo_core::identity::ExternalIdentity;
use credo_core::model::{NewUser, UserPatch, UserRecord};

use crate::context::AuthContext;
use crate::ops::login::SignInResponse;
use crate::token;
use crate::validate;

/// Sign in with a provider token, linking or creating an account.
///
/// Requires the identity verifier capability. Lookup is by provider subject
/// first, then by the claimed email; a match by email links the external id
/// onto the existing account. Soft-deleted accounts cannot come back through
/// this path and surface as `InvalidCredentials`.
pub async fn federated_sign_in(ctx: &Arc<AuthContext>, provider_token: &str) -> Result<SignInResponse> {
    let verifier = ctx
        .identity
        .as_ref()
        .ok_or_else(|| AuthError::Validation("Federated sign-in is not enabled".into()))?;

    let identity = verifier.verify(provider_token).await?;
    let email = validate::normalize_email(&identity.email);

    let existing = match ctx.store.find_by_external_id(&identity.external_id).await? {
        Some(user) => Some(user),
        None => ctx.store.find_by_email(&email).await?,
    };

    let user = match existing {
        Some(user) if user.is_deleted => return Err(AuthError::InvalidCredentials),
        Some(user) => link_identity(ctx, user, &identity).await?,
        None => create_from_identity(ctx, &identity, email).await?,
    };

    let token = token::sign_session(&ctx.options.secret, &user.id, ctx.options.session_ttl())?;
    Ok(SignInResponse { token, user })
}

/// Merge provider claims onto an existing account.
///
/// Non-destructive: populated fields are never overwritten with empty ones,
/// and an already-linked external id is left alone.
async fn link_identity(
    ctx: &Arc<AuthContext>,
    user: UserRecord,
    identity: &ExternalIdentity,
) -> Result<UserRecord> {
    let mut patch = UserPatch::default();

    if user.external_id.is_none() {
        patch.external_id = Some(identity.external_id.clone());
    }
    if let Some(name) = non_empty(&identity.display_name) {
        patch.display_name = Some(name);
    }
    if let Some(url) = non_empty(&identity.avatar_url) {
        patch.avatar_url = Some(url);
    }
    if identity.email_verified && !user.email_verified {
        patch.email_verified = Some(true);
    }

    if patch.is_empty() {
        return Ok(user);
    }
    ctx.store
        .update(&user.id, patch)
        .await?
        .ok_or(AuthError::NotFound)
}

async fn create_from_identity(
    ctx: &Arc<AuthContext>,
    identity: &ExternalIdentity,
    email: String,
) -> Result<UserRecord> {
    let user = NewUser {
        username: generate_username(identity.display_name.as_deref()),
        email,
        password_hash: None,
        email_verified: identity.email_verified,
        email_otp: None,
        role: ctx.options.default_role,
        external_id: Some(identity.external_id.clone()),
        display_name: identity.display_name.clone(),
        avatar_url: identity.avatar_url.clone(),
    };
    ctx.store.create(user).await
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Derive a username from the provider display name plus a random numeric
/// suffix. Usernames are not a uniqueness key, so a collision is cosmetic.
fn generate_username(display_name: Option<&str>) -> String {
    use rand::Rng;

    let base: String = display_name
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(validate::USERNAME_MAX - 4)
        .collect::<String>()
        .to_lowercase();
    let base = if base.len() >= validate::USERNAME_MIN {
        base
    } else {
        "user".to_owned()
    };

    let suffix: u16 = rand::rngs::OsRng.gen_range(1000..10000);
    format!("{base}{suffix}")
}
