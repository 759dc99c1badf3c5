//! `passgate-auth` — pure security primitives for the authentication core.
//!
//! This crate is intentionally decoupled from HTTP and storage: hashing,
//! code/token generation, token verification and the authorization policy
//! check are all IO-free and deterministic given their inputs.

pub mod claims;
pub mod code;
pub mod password;
pub mod rbac;
pub mod token;

pub use claims::{AccessClaims, TokenError};
pub use code::generate_six_digit_code;
pub use password::{BcryptSetting, PasswordHasher};
pub use rbac::{
    authorize, is_allowed, Action, AuthenticatedUser, Ownership, RequiredPermission, Role,
};
pub use token::{IssuedRefreshToken, TokenConfig, TokenIssuer};
