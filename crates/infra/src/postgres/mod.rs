//! Postgres-backed stores.
//!
//! Each store wraps a shared `PgPool`. Domain records are mapped through
//! plain row structs; role and purpose discriminators are stored as TEXT.
//! Schema lives in `migrations/`.

mod code_store;
mod identity_store;
mod session_store;

pub use code_store::PostgresCodeStore;
pub use identity_store::PostgresIdentityStore;
pub use session_store::PostgresSessionStore;

use passgate_identity::StoreError;

/// Postgres unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == UNIQUE_VIOLATION;
        }
    }
    false
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    StoreError::backend(format!("{operation}: {err}"))
}
