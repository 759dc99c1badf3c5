//! Tracing/logging initialization.
//!
//! JSON lines on stdout, filtered via `RUST_LOG` with an `info` default.
//! Secrets, password hashes and raw tokens must never be logged; callers log
//! identifiers and error kinds only.

use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the process.
///
/// `service` is attached to every event so multi-service log streams stay
/// attributable. Safe to call multiple times (subsequent calls are no-ops).
pub fn init(service: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let initialized = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init()
        .is_ok();

    if initialized {
        tracing::info!(service, "logging initialized");
    }
}
