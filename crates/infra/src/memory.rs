//! In-memory store implementations.
//!
//! Used for local development without a database and for integration tests.
//! Same observable semantics as the Postgres stores, minus durability.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use passgate_core::{CodeId, DeviceId, SessionId, UserId};
use passgate_identity::{
    CodeRecord, CodeStore, IdentityStore, Session, SessionStore, StoreError, StoreResult, User,
};

#[derive(Default)]
pub struct InMemoryIdentityStore {
    rows: Mutex<HashMap<UserId, User>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let rows = self.rows.lock().map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(rows.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        let rows = self.rows.lock().map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(rows.get(&id).cloned())
    }

    async fn create(&self, user: &User) -> StoreResult<()> {
        let mut rows = self.rows.lock().map_err(|_| StoreError::backend("poisoned lock"))?;
        if rows.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate(user.email.clone()));
        }
        rows.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> StoreResult<()> {
        let mut rows = self.rows.lock().map_err(|_| StoreError::backend("poisoned lock"))?;
        match rows.get_mut(&user.id) {
            Some(row) => {
                *row = user.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }
}

#[derive(Default)]
pub struct InMemorySessionStore {
    rows: Mutex<HashMap<SessionId, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, session: &Session) -> StoreResult<()> {
        let mut rows = self.rows.lock().map_err(|_| StoreError::backend("poisoned lock"))?;
        rows.insert(session.id, session.clone());
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> StoreResult<Option<Session>> {
        let rows = self.rows.lock().map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(rows.values().find(|s| s.token == token).cloned())
    }

    async fn find_by_id(&self, id: SessionId) -> StoreResult<Option<Session>> {
        let rows = self.rows.lock().map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(rows.get(&id).cloned())
    }

    async fn list_by_user(&self, user_id: UserId) -> StoreResult<Vec<Session>> {
        let rows = self.rows.lock().map_err(|_| StoreError::backend("poisoned lock"))?;
        let mut sessions: Vec<Session> = rows
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        // HashMap order is arbitrary; present oldest-first like the SQL store.
        sessions.sort_by_key(|s| s.created_at);
        Ok(sessions)
    }

    async fn delete_by_id(&self, id: SessionId) -> StoreResult<u64> {
        let mut rows = self.rows.lock().map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(rows.remove(&id).map(|_| 1).unwrap_or(0))
    }

    async fn delete_by_user_and_device(
        &self,
        user_id: UserId,
        device_id: DeviceId,
    ) -> StoreResult<u64> {
        let mut rows = self.rows.lock().map_err(|_| StoreError::backend("poisoned lock"))?;
        let before = rows.len();
        rows.retain(|_, s| !(s.user_id == user_id && s.device_id == device_id));
        Ok((before - rows.len()) as u64)
    }

    async fn delete_all_expired(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let mut rows = self.rows.lock().map_err(|_| StoreError::backend("poisoned lock"))?;
        let before = rows.len();
        rows.retain(|_, s| s.expires_at > now);
        Ok((before - rows.len()) as u64)
    }
}

#[derive(Default)]
pub struct InMemoryCodeStore {
    rows: Mutex<HashMap<CodeId, CodeRecord>>,
}

impl InMemoryCodeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CodeStore for InMemoryCodeStore {
    async fn create(&self, record: &CodeRecord) -> StoreResult<()> {
        let mut rows = self.rows.lock().map_err(|_| StoreError::backend("poisoned lock"))?;
        rows.insert(record.id, record.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: CodeId) -> StoreResult<Option<CodeRecord>> {
        let rows = self.rows.lock().map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(rows.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use passgate_auth::Role;

    fn user(email: &str) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: email.into(),
            password_hash: "$2b$04$placeholderplaceholderplaceholde".into(),
            role: Role::User,
            is_active: true,
            is_email_verified: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn session(user_id: UserId, expires_at: DateTime<Utc>) -> Session {
        Session {
            id: SessionId::new(),
            user_id,
            token: SessionId::new().to_string(),
            device_id: DeviceId::new(),
            device_name: "laptop".into(),
            created_at: expires_at - Duration::hours(1),
            expires_at,
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_on_create() {
        let store = InMemoryIdentityStore::new();
        store.create(&user("ada@example.com")).await.unwrap();
        let err = store.create(&user("ada@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn update_of_a_missing_user_is_not_found() {
        let store = InMemoryIdentityStore::new();
        let err = store.update(&user("ada@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn expired_sweep_reports_the_deleted_count() {
        let store = InMemorySessionStore::new();
        let now = Utc::now();
        let owner = UserId::new();
        store.create(&session(owner, now - Duration::seconds(1))).await.unwrap();
        store.create(&session(owner, now - Duration::hours(2))).await.unwrap();
        store.create(&session(owner, now + Duration::hours(1))).await.unwrap();

        assert_eq!(store.delete_all_expired(now).await.unwrap(), 2);
        assert_eq!(store.list_by_user(owner).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn listing_is_oldest_first() {
        let store = InMemorySessionStore::new();
        let now = Utc::now();
        let owner = UserId::new();
        let newer = session(owner, now + Duration::hours(2));
        let mut older = session(owner, now + Duration::hours(1));
        older.created_at = newer.created_at - Duration::hours(1);
        store.create(&newer).await.unwrap();
        store.create(&older).await.unwrap();

        let listed = store.list_by_user(owner).await.unwrap();
        assert_eq!(listed[0].id, older.id);
        assert_eq!(listed[1].id, newer.id);
    }
}
