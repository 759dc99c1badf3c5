//! Access-token issuing/verification and opaque refresh-token generation.
//!
//! Access tokens are RS256-signed JWTs. Refresh tokens are cryptographically
//! random opaque values; they carry no claims and are only meaningful as a
//! lookup key into the session store.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;

use passgate_core::{AuthError, AuthResult, UserId};

use crate::claims::{AccessClaims, TokenError};
use crate::rbac::Role;

/// Token-related configuration, validated once at startup.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub issuer: String,
    pub audience: String,
    pub access_ttl_hours: i64,
    pub refresh_ttl_hours: i64,
    /// RSA private key, PEM encoded (PKCS#1 or PKCS#8).
    pub private_key_pem: String,
    /// RSA public key, PEM encoded.
    pub public_key_pem: String,
}

/// A freshly issued access token together with its expiry.
#[derive(Debug, Clone)]
pub struct IssuedAccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// A freshly generated refresh token together with its expiry.
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies credentials. Immutable after construction.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(config: &TokenConfig) -> AuthResult<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(config.private_key_pem.as_bytes())
            .map_err(|e| AuthError::config(format!("invalid RSA private key: {e}")))?;
        let decoding_key = DecodingKey::from_rsa_pem(config.public_key_pem.as_bytes())
            .map_err(|e| AuthError::config(format!("invalid RSA public key: {e}")))?;
        if config.access_ttl_hours <= 0 || config.refresh_ttl_hours <= 0 {
            return Err(AuthError::config("token TTLs must be positive"));
        }

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        // Expiry and issued-at are checked explicitly against the caller's
        // clock so verification stays deterministic under test.
        validation.validate_exp = false;

        Ok(Self {
            encoding_key,
            decoding_key,
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_ttl: Duration::hours(config.access_ttl_hours),
            refresh_ttl: Duration::hours(config.refresh_ttl_hours),
        })
    }

    /// Build and sign the claim set for `user_id` with expiry `now + access TTL`.
    pub fn issue_access_token(
        &self,
        user_id: UserId,
        role: Role,
        now: DateTime<Utc>,
    ) -> AuthResult<IssuedAccessToken> {
        let expires_at = now + self.access_ttl;
        let claims = AccessClaims {
            sub: user_id,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|err| {
                tracing::error!(error = %err, "failed to sign access token");
                AuthError::Internal
            })?;
        Ok(IssuedAccessToken { token, expires_at })
    }

    /// Verify signature, issuer and audience, then the time window.
    ///
    /// The three failure kinds are deliberately distinct: expiry means "retry
    /// with a refresh token", anything structural means "reject outright".
    pub fn verify_access_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<AccessClaims, TokenError> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| TokenError::Malformed)?;
        let claims = data.claims;

        if claims.exp <= claims.iat {
            return Err(TokenError::Malformed);
        }
        if now.timestamp() < claims.iat {
            return Err(TokenError::NotYetValid);
        }
        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    /// Produce an opaque refresh token (32 random bytes, hex) expiring at
    /// `now + refresh TTL`.
    pub fn generate_refresh_token(&self, now: DateTime<Utc>) -> IssuedRefreshToken {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        IssuedRefreshToken {
            token: hex::encode(bytes),
            expires_at: now + self.refresh_ttl,
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    use rsa::pkcs1::{EncodeRsaPrivateKey, EncodeRsaPublicKey, LineEnding};
    use rsa::RsaPrivateKey;

    fn test_key_pems() -> &'static (String, String) {
        static KEYS: OnceLock<(String, String)> = OnceLock::new();
        KEYS.get_or_init(|| {
            let mut rng = rand::thread_rng();
            let private = RsaPrivateKey::new(&mut rng, 2048).expect("rsa keygen");
            let public = private.to_public_key();
            (
                private
                    .to_pkcs1_pem(LineEnding::LF)
                    .expect("private pem")
                    .to_string(),
                public.to_pkcs1_pem(LineEnding::LF).expect("public pem"),
            )
        })
    }

    fn issuer() -> TokenIssuer {
        let (private_key_pem, public_key_pem) = test_key_pems().clone();
        TokenIssuer::new(&TokenConfig {
            issuer: "passgate".to_string(),
            audience: "passgate-clients".to_string(),
            access_ttl_hours: 1,
            refresh_ttl_hours: 720,
            private_key_pem,
            public_key_pem,
        })
        .unwrap()
    }

    #[test]
    fn issued_token_verifies_and_claims_round_trip() {
        let issuer = issuer();
        let user_id = UserId::new();
        let now = Utc::now();

        let issued = issuer.issue_access_token(user_id, Role::User, now).unwrap();
        let claims = issuer.verify_access_token(&issued.token, now).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.iss, "passgate");
        assert_eq!(claims.aud, "passgate-clients");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn expired_token_reports_expired_not_malformed() {
        let issuer = issuer();
        let now = Utc::now();
        let issued = issuer
            .issue_access_token(UserId::new(), Role::User, now - Duration::hours(2))
            .unwrap();

        let err = issuer.verify_access_token(&issued.token, now).unwrap_err();
        assert_eq!(err, TokenError::Expired);
    }

    #[test]
    fn future_token_reports_not_yet_valid() {
        let issuer = issuer();
        let now = Utc::now();
        let issued = issuer
            .issue_access_token(UserId::new(), Role::Admin, now + Duration::hours(1))
            .unwrap();

        let err = issuer.verify_access_token(&issued.token, now).unwrap_err();
        assert_eq!(err, TokenError::NotYetValid);
    }

    #[test]
    fn tampered_token_reports_malformed() {
        let issuer = issuer();
        let now = Utc::now();
        let issued = issuer
            .issue_access_token(UserId::new(), Role::User, now)
            .unwrap();

        let mut tampered = issued.token.clone();
        tampered.push('x');
        assert_eq!(
            issuer.verify_access_token(&tampered, now).unwrap_err(),
            TokenError::Malformed
        );
        assert_eq!(
            issuer.verify_access_token("garbage", now).unwrap_err(),
            TokenError::Malformed
        );
    }

    #[test]
    fn refresh_tokens_are_opaque_unique_and_expiry_matches_ttl() {
        let issuer = issuer();
        let now = Utc::now();
        let a = issuer.generate_refresh_token(now);
        let b = issuer.generate_refresh_token(now);

        assert_ne!(a.token, b.token);
        assert_eq!(a.token.len(), 64);
        assert_eq!(a.expires_at, now + Duration::hours(720));
        // Not a JWT: no dot-separated segments.
        assert!(!a.token.contains('.'));
    }

    #[test]
    fn rejects_invalid_key_material() {
        let err = TokenIssuer::new(&TokenConfig {
            issuer: "x".into(),
            audience: "y".into(),
            access_ttl_hours: 1,
            refresh_ttl_hours: 1,
            private_key_pem: "not a pem".into(),
            public_key_pem: "not a pem".into(),
        })
        .unwrap_err();
        assert!(matches!(err, AuthError::Config(_)));
    }
}
