//! `passgate-infra` — store and delivery adapters.
//!
//! Implements the ports defined in `passgate-identity`: Postgres-backed
//! stores for deployments with a database, in-memory stores for local runs
//! and tests, and notification senders (structured-log and HTTP email API).

pub mod email;
pub mod memory;
pub mod postgres;

pub use email::{HttpNotificationSender, LogNotificationSender};
pub use memory::{InMemoryCodeStore, InMemoryIdentityStore, InMemorySessionStore};
pub use postgres::{PostgresCodeStore, PostgresIdentityStore, PostgresSessionStore};
