// Administrative record management.
//
// Authorization is the caller's responsibility; these functions assume the
// controller layer has already checked the acting user's role.

use std::sync::Arc;

use credo_core::error::{AuthError, Result};
use credo_core::model::{Role, UserPatch, UserRecord};
use credo_core::store::require_by_id;

use crate::context::AuthContext;

/// Soft-delete a record. The record stays in the store for later restore;
/// nothing here hard-deletes.
pub async fn soft_delete(ctx: &Arc<AuthContext>, id: &str) -> Result<UserRecord> {
    require_by_id(ctx.store.as_ref(), id).await?;
    apply(ctx, id, UserPatch {
        is_deleted: Some(true),
        ..Default::default()
    })
    .await
}

/// Bring a soft-deleted record back.
///
/// Fails when another live record has claimed the email in the meantime;
/// restoring anyway would leave two live records behind one email and make
/// every email-keyed lookup ambiguous.
pub async fn restore(ctx: &Arc<AuthContext>, id: &str) -> Result<UserRecord> {
    let user = require_by_id(ctx.store.as_ref(), id).await?;
    if !user.is_deleted {
        return Err(AuthError::Validation("User is not deleted".into()));
    }
    if ctx.store.exists_by_email(&user.email).await? {
        return Err(AuthError::DuplicateEmail);
    }
    apply(ctx, id, UserPatch {
        is_deleted: Some(false),
        ..Default::default()
    })
    .await
}

/// Assign a role from the closed set.
pub async fn change_role(ctx: &Arc<AuthContext>, id: &str, role: &str) -> Result<UserRecord> {
    let role = Role::parse(role)?;
    require_by_id(ctx.store.as_ref(), id).await?;
    apply(ctx, id, UserPatch {
        role: Some(role),
        ..Default::default()
    })
    .await
}

async fn apply(ctx: &Arc<AuthContext>, id: &str, patch: UserPatch) -> Result<UserRecord> {
    ctx.store.update(id, patch).await?.ok_or(AuthError::NotFound)
}
