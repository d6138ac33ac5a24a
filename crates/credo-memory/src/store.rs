// In-memory user store, HashMap keyed by record id behind a tokio RwLock.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use credo_core::model::{NewUser, UserPatch, UserRecord};
use credo_core::store::{StoreResult, UserStore};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    users: Arc<RwLock<HashMap<String, UserRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record count, deleted included.
    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }

    /// Full record by id, hidden fields included. Test inspection only.
    pub async fn raw(&self, id: &str) -> Option<UserRecord> {
        self.users.read().await.get(id).cloned()
    }
}

fn apply_patch(record: &mut UserRecord, patch: UserPatch) {
    if let Some(v) = patch.username {
        record.username = v;
    }
    if let Some(v) = patch.password_hash {
        record.password_hash = Some(v);
    }
    if let Some(v) = patch.email_verified {
        record.email_verified = v;
    }
    if let Some(change) = patch.email_otp {
        record.email_otp = change.apply();
    }
    if let Some(change) = patch.password_reset_otp {
        record.password_reset_otp = change.apply();
    }
    if let Some(v) = patch.role {
        record.role = v;
    }
    if let Some(v) = patch.is_deleted {
        record.is_deleted = v;
    }
    if let Some(v) = patch.external_id {
        record.external_id = Some(v);
    }
    if let Some(v) = patch.display_name {
        record.display_name = Some(v);
    }
    if let Some(v) = patch.avatar_url {
        record.avatar_url = Some(v);
    }
    record.updated_at = Utc::now();
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self
            .find_by_email_with_secrets(email)
            .await?
            .map(UserRecord::without_secrets))
    }

    async fn find_by_email_with_secrets(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self
            .find_by_id_with_secrets(id)
            .await?
            .map(UserRecord::without_secrets))
    }

    async fn find_by_id_with_secrets(&self, id: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_external_id(&self, external_id: &str) -> StoreResult<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.external_id.as_deref() == Some(external_id))
            .cloned()
            .map(UserRecord::without_secrets))
    }

    async fn exists_by_email(&self, email: &str) -> StoreResult<bool> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .any(|u| !u.is_deleted && u.email.eq_ignore_ascii_case(email)))
    }

    async fn create(&self, user: NewUser) -> StoreResult<UserRecord> {
        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            email_verified: user.email_verified,
            email_otp: user.email_otp,
            password_reset_otp: None,
            role: user.role,
            is_deleted: false,
            external_id: user.external_id,
            display_name: user.display_name,
            avatar_url: user.avatar_url,
            created_at: now,
            updated_at: now,
        };
        let mut users = self.users.write().await;
        users.insert(record.id.clone(), record.clone());
        Ok(record.without_secrets())
    }

    async fn update(&self, id: &str, patch: UserPatch) -> StoreResult<Option<UserRecord>> {
        let mut users = self.users.write().await;
        match users.get_mut(id) {
            Some(record) => {
                apply_patch(record, patch);
                Ok(Some(record.clone().without_secrets()))
            }
            None => Ok(None),
        }
    }
}
