// User record store trait — the storage seam every backend implements.
//
// Deliberately narrow: per-record read-then-write only, no cross-record
// transactions. Default reads exclude hidden fields (password hash, sealed
// OTPs); callers that need them must ask via the `_with_secrets` variants.

use async_trait::async_trait;

use crate::error::AuthError;
use crate::model::{NewUser, UserPatch, UserRecord};

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, AuthError>;

/// Persistent user-record store.
///
/// Implementations must treat emails case-insensitively (callers lowercase
/// at the boundary, but lookups should not depend on it) and must assign
/// `id`, `created_at`, and `updated_at` on create.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find by email, hidden fields stripped.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;

    /// Find by email including hidden fields.
    async fn find_by_email_with_secrets(&self, email: &str) -> StoreResult<Option<UserRecord>>;

    /// Find by id, hidden fields stripped.
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<UserRecord>>;

    /// Find by id including hidden fields.
    async fn find_by_id_with_secrets(&self, id: &str) -> StoreResult<Option<UserRecord>>;

    /// Find by identity-provider subject, hidden fields stripped.
    async fn find_by_external_id(&self, external_id: &str) -> StoreResult<Option<UserRecord>>;

    /// Whether a non-deleted record is bound to this email.
    async fn exists_by_email(&self, email: &str) -> StoreResult<bool>;

    /// Create a record. The store assigns id and timestamps.
    async fn create(&self, user: NewUser) -> StoreResult<UserRecord>;

    /// Apply a partial update. Returns the updated record (with hidden
    /// fields stripped), or `None` when no record matches.
    async fn update(&self, id: &str, patch: UserPatch) -> StoreResult<Option<UserRecord>>;
}

/// Shorthand for the not-found-as-error pattern used by the admin operations.
pub async fn require_by_id(store: &dyn UserStore, id: &str) -> StoreResult<UserRecord> {
    store.find_by_id(id).await?.ok_or(AuthError::NotFound)
}
