use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use passgate_core::{DeviceId, SessionId, UserId};
use passgate_identity::{Session, SessionStore, StoreResult};

use super::map_sqlx_error;

#[derive(Debug, Clone)]
pub struct PostgresSessionStore {
    pool: Arc<PgPool>,
}

impl PostgresSessionStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SessionRow {
    id: Uuid,
    user_id: Uuid,
    token: String,
    device_id: Uuid,
    device_name: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            id: SessionId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            token: row.token,
            device_id: DeviceId::from_uuid(row.device_id),
            device_name: row.device_name,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

const SELECT_SESSION: &str = r#"
    SELECT id, user_id, token, device_id, device_name, created_at, expires_at
    FROM sessions
"#;

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn create(&self, session: &Session) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (
                id, user_id, token, device_id, device_name, created_at, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(session.id.as_uuid())
        .bind(session.user_id.as_uuid())
        .bind(&session.token)
        .bind(session.device_id.as_uuid())
        .bind(&session.device_name)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_session", e))?;
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> StoreResult<Option<Session>> {
        let row: Option<SessionRow> =
            sqlx::query_as(&format!("{SELECT_SESSION} WHERE token = $1"))
                .bind(token)
                .fetch_optional(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("find_session_by_token", e))?;
        Ok(row.map(Session::from))
    }

    async fn find_by_id(&self, id: SessionId) -> StoreResult<Option<Session>> {
        let row: Option<SessionRow> =
            sqlx::query_as(&format!("{SELECT_SESSION} WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("find_session_by_id", e))?;
        Ok(row.map(Session::from))
    }

    async fn list_by_user(&self, user_id: UserId) -> StoreResult<Vec<Session>> {
        let rows: Vec<SessionRow> = sqlx::query_as(&format!(
            "{SELECT_SESSION} WHERE user_id = $1 ORDER BY created_at ASC"
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_sessions_by_user", e))?;
        Ok(rows.into_iter().map(Session::from).collect())
    }

    async fn delete_by_id(&self, id: SessionId) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_session_by_id", e))?;
        Ok(result.rows_affected())
    }

    async fn delete_by_user_and_device(
        &self,
        user_id: UserId,
        device_id: DeviceId,
    ) -> StoreResult<u64> {
        let result =
            sqlx::query("DELETE FROM sessions WHERE user_id = $1 AND device_id = $2")
                .bind(user_id.as_uuid())
                .bind(device_id.as_uuid())
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("delete_session_by_device", e))?;
        Ok(result.rows_affected())
    }

    async fn delete_all_expired(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_expired_sessions", e))?;
        Ok(result.rows_affected())
    }
}
