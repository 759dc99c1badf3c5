use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use passgate_core::{CodeId, UserId};
use passgate_identity::{CodePurpose, CodeRecord, CodeStore, StoreError, StoreResult};

use super::map_sqlx_error;

#[derive(Debug, Clone)]
pub struct PostgresCodeStore {
    pool: Arc<PgPool>,
}

impl PostgresCodeStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CodeRow {
    id: Uuid,
    user_id: Uuid,
    code: String,
    purpose: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl TryFrom<CodeRow> for CodeRecord {
    type Error = StoreError;

    fn try_from(row: CodeRow) -> Result<Self, Self::Error> {
        let purpose = match row.purpose.as_str() {
            "email_verification" => CodePurpose::EmailVerification,
            "password_reset" => CodePurpose::PasswordReset,
            other => {
                return Err(StoreError::backend(format!(
                    "corrupt purpose column: {other}"
                )))
            }
        };
        Ok(CodeRecord {
            id: CodeId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            code: row.code,
            purpose,
            created_at: row.created_at,
            expires_at: row.expires_at,
        })
    }
}

#[async_trait]
impl CodeStore for PostgresCodeStore {
    async fn create(&self, record: &CodeRecord) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO auth_codes (id, user_id, code, purpose, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.user_id.as_uuid())
        .bind(&record.code)
        .bind(record.purpose.as_str())
        .bind(record.created_at)
        .bind(record.expires_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_code", e))?;
        Ok(())
    }

    async fn find_by_id(&self, id: CodeId) -> StoreResult<Option<CodeRecord>> {
        let row: Option<CodeRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, code, purpose, created_at, expires_at
            FROM auth_codes
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_code_by_id", e))?;
        row.map(CodeRecord::try_from).transpose()
    }
}
