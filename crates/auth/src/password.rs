//! Credential hashing and verification.
//!
//! Bcrypt with a cost/salt setting read from configuration exactly once.
//! The setting is either a positive integer cost factor or an explicit bcrypt
//! salt string (`$2b$<cost>$<22-char salt>`); anything else is a fatal
//! configuration error.

use base64::engine::{DecodePaddingMode, Engine, GeneralPurpose, GeneralPurposeConfig};
use base64::alphabet;
use passgate_core::{AuthError, AuthResult};

const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

const UNDEFINED_SALT_OR_ROUNDS: &str = "BCRYPT_SALT is not defined";
const SALT_OR_ROUNDS_TYPE: &str =
    "BCRYPT_SALT must be a positive integer cost factor or a bcrypt salt string";

// Bcrypt uses its own base64 alphabet; 22 chars encode a 16-byte salt with
// four trailing bits that must be tolerated on decode.
const BCRYPT_B64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::BCRYPT,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

/// Parsed work-factor/salt configuration, immutable after startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BcryptSetting {
    /// Random salt per hash with this cost factor.
    Cost(u32),
    /// Fixed salt (and the cost embedded in the salt string).
    Salt { cost: u32, salt: [u8; 16] },
}

impl BcryptSetting {
    /// Parse the raw configuration value.
    ///
    /// Numeric values are cost factors and must be integers within bcrypt's
    /// accepted range. Non-numeric values must be a full bcrypt salt string.
    pub fn parse(value: Option<&str>) -> AuthResult<Self> {
        let value = match value {
            Some(v) if !v.trim().is_empty() => v.trim(),
            _ => return Err(AuthError::config(UNDEFINED_SALT_OR_ROUNDS)),
        };

        if value.chars().all(|c| c.is_ascii_digit() || c == '-' || c == '+') {
            let cost: i64 = value
                .parse()
                .map_err(|_| AuthError::config(SALT_OR_ROUNDS_TYPE))?;
            if cost < MIN_COST as i64 || cost > MAX_COST as i64 {
                return Err(AuthError::config(format!(
                    "BCRYPT_SALT cost factor must be between {MIN_COST} and {MAX_COST}"
                )));
            }
            return Ok(Self::Cost(cost as u32));
        }

        Self::parse_salt_string(value)
    }

    fn parse_salt_string(value: &str) -> AuthResult<Self> {
        let mut parts = value.split('$');
        // A salt string starts with '$', so the first segment is empty.
        if parts.next() != Some("") {
            return Err(AuthError::config(SALT_OR_ROUNDS_TYPE));
        }
        match parts.next() {
            Some("2a") | Some("2b") | Some("2x") | Some("2y") => {}
            _ => return Err(AuthError::config(SALT_OR_ROUNDS_TYPE)),
        }
        let cost: u32 = parts
            .next()
            .and_then(|c| c.parse().ok())
            .ok_or_else(|| AuthError::config(SALT_OR_ROUNDS_TYPE))?;
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(AuthError::config(format!(
                "BCRYPT_SALT cost factor must be between {MIN_COST} and {MAX_COST}"
            )));
        }
        let encoded = parts
            .next()
            .ok_or_else(|| AuthError::config(SALT_OR_ROUNDS_TYPE))?;
        if parts.next().is_some() || encoded.len() < 22 {
            return Err(AuthError::config(SALT_OR_ROUNDS_TYPE));
        }
        let decoded = BCRYPT_B64
            .decode(&encoded[..22])
            .map_err(|_| AuthError::config(SALT_OR_ROUNDS_TYPE))?;
        let salt: [u8; 16] = decoded
            .try_into()
            .map_err(|_| AuthError::config(SALT_OR_ROUNDS_TYPE))?;
        Ok(Self::Salt { cost, salt })
    }
}

/// One-way hasher for user secrets.
///
/// Deliberately slow and salted. Constructed once at startup from validated
/// configuration and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    setting: BcryptSetting,
}

impl PasswordHasher {
    pub fn new(setting: BcryptSetting) -> Self {
        Self { setting }
    }

    pub fn hash(&self, secret: &str) -> AuthResult<String> {
        let hashed = match &self.setting {
            BcryptSetting::Cost(cost) => bcrypt::hash(secret, *cost),
            BcryptSetting::Salt { cost, salt } => {
                bcrypt::hash_with_salt(secret, *cost, *salt)
                    .map(|parts| parts.format_for_version(bcrypt::Version::TwoB))
            }
        };
        hashed.map_err(|err| {
            tracing::error!(error = %err, "password hashing failed");
            AuthError::Internal
        })
    }

    /// Verify a secret against a stored hash.
    ///
    /// Never fails: a malformed hash or a mismatch both report `false`.
    pub fn compare(&self, secret: &str, hashed: &str) -> bool {
        bcrypt::verify(secret, hashed).unwrap_or(false)
    }
}
