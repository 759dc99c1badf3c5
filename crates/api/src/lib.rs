//! `passgate-api` — HTTP surface for the authentication core.
//!
//! Layout:
//! - `config.rs`: environment-backed configuration, validated once at startup
//! - `middleware.rs`: bearer-token authentication, populates the request context
//! - `authz.rs`: explicit per-route authorization guard
//! - `app/`: router wiring, DTOs, error mapping, route handlers

pub mod app;
pub mod authz;
pub mod config;
pub mod context;
pub mod middleware;
