//! Shared tracing/logging setup for the passgate binaries.

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use crate::tracing::init;
