//! Authentication service: the state machine over session records.
//!
//! Sessions are *Active* from creation until they are rotated (refresh),
//! revoked (logout / explicit revocation) or swept after expiry; all three
//! are terminal and implemented as deletion of the record.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use passgate_auth::{PasswordHasher, TokenIssuer};
use passgate_core::{AuthError, AuthResult, Clock, DeviceId, SessionId, UserId};

use crate::store::{IdentityStore, SessionStore};
use crate::user::{PublicUser, Session, SessionSummary, User};

const UNKNOWN_DEVICE: &str = "Unknown device";

/// Device metadata accompanying a login or refresh request.
#[derive(Debug, Clone, Default)]
pub struct DeviceContext {
    /// Usually the client's user-agent; optional.
    pub device_name: Option<String>,
}

/// Both credentials handed out by login/refresh, plus device metadata.
#[derive(Debug, Clone)]
pub struct AuthTokens {
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_token_expires_at: DateTime<Utc>,
    pub device_id: DeviceId,
    pub device_name: String,
}

/// Successful login: tokens plus the public profile.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub auth: AuthTokens,
    pub user: PublicUser,
}

/// Orchestrates login, refresh, logout and session management.
pub struct AuthService {
    users: Arc<dyn IdentityStore>,
    sessions: Arc<dyn SessionStore>,
    hasher: Arc<PasswordHasher>,
    tokens: Arc<TokenIssuer>,
    clock: Arc<dyn Clock>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn IdentityStore>,
        sessions: Arc<dyn SessionStore>,
        hasher: Arc<PasswordHasher>,
        tokens: Arc<TokenIssuer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            sessions,
            hasher,
            tokens,
            clock,
        }
    }

    /// Authenticate with email + password and mint a new device session.
    ///
    /// Unknown email and wrong password are indistinguishable in the response
    /// (anti-enumeration); the difference exists only in logs.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        device: DeviceContext,
    ) -> AuthResult<LoginOutcome> {
        let user = match self.users.find_by_email(email).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::debug!("login rejected: no account for the supplied email");
                return Err(AuthError::InvalidCredentials);
            }
            Err(err) => {
                tracing::error!(error = %err, "user lookup failed during login");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !self.hasher.compare(password, &user.password_hash) {
            tracing::debug!(user_id = %user.id, "login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AuthError::AccountInactive {
                email_verified: user.is_email_verified,
            });
        }

        let device_name = device.device_name.unwrap_or_else(|| UNKNOWN_DEVICE.to_string());
        let auth = self
            .mint_session(&user, DeviceId::new(), device_name)
            .await?;

        Ok(LoginOutcome {
            auth,
            user: user.public(),
        })
    }

    /// Exchange a refresh token for a new token pair (rotation).
    ///
    /// The old session record is deleted best-effort: a deletion failure is
    /// logged, never surfaced, since the record will be swept once expired.
    /// Two concurrent refreshes with the same not-yet-deleted token can both
    /// succeed; that narrow window is accepted rather than closed with a
    /// conditional delete.
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
        device: DeviceContext,
    ) -> AuthResult<AuthTokens> {
        let old = match self.sessions.find_by_token(refresh_token).await {
            Ok(Some(session)) => session,
            Ok(None) => return Err(AuthError::Unauthorized),
            Err(err) => {
                tracing::error!(error = %err, "session lookup failed during refresh");
                return Err(AuthError::Unauthorized);
            }
        };

        if old.is_expired(self.clock.now()) {
            return Err(AuthError::InvalidRefreshToken);
        }

        let user = match self.users.find_by_id(old.user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return Err(AuthError::Unauthorized),
            Err(err) => {
                tracing::error!(error = %err, user_id = %old.user_id, "user lookup failed during refresh");
                return Err(AuthError::Unauthorized);
            }
        };

        let device_name = device
            .device_name
            .unwrap_or_else(|| old.device_name.clone());
        let auth = self.mint_session(&user, old.device_id, device_name).await?;

        if let Err(err) = self.sessions.delete_by_id(old.id).await {
            tracing::warn!(error = %err, session_id = %old.id, "failed to delete rotated session");
        }

        Ok(auth)
    }

    /// Delete the session(s) for this identity + device.
    pub async fn logout(
        &self,
        user_id: UserId,
        device_id: DeviceId,
        _refresh_token: &str,
    ) -> AuthResult<()> {
        match self
            .sessions
            .delete_by_user_and_device(user_id, device_id)
            .await
        {
            Ok(0) => Err(AuthError::Unauthorized),
            Ok(count) => {
                tracing::debug!(user_id = %user_id, device_id = %device_id, count, "logout removed sessions");
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "session deletion failed during logout");
                Err(AuthError::Unauthorized)
            }
        }
    }

    /// All non-expired sessions for the identity, in store order.
    pub async fn list_active_sessions(&self, user_id: UserId) -> AuthResult<Vec<SessionSummary>> {
        let now = self.clock.now();
        let sessions = self.sessions.list_by_user(user_id).await.map_err(|err| {
            tracing::error!(error = %err, user_id = %user_id, "session listing failed");
            AuthError::Internal
        })?;

        Ok(sessions
            .iter()
            .filter(|s| !s.is_expired(now))
            .map(SessionSummary::from)
            .collect())
    }

    /// Delete one session, scoped to its owner.
    ///
    /// A session belonging to another identity reports `Unauthorized`, same
    /// as a missing one, so revocation cannot be used to probe session ids.
    pub async fn revoke_session(&self, user_id: UserId, session_id: SessionId) -> AuthResult<()> {
        let session = match self.sessions.find_by_id(session_id).await {
            Ok(Some(session)) => session,
            Ok(None) => return Err(AuthError::Unauthorized),
            Err(err) => {
                tracing::error!(error = %err, "session lookup failed during revocation");
                return Err(AuthError::Unauthorized);
            }
        };

        if session.user_id != user_id {
            tracing::warn!(
                user_id = %user_id,
                session_id = %session_id,
                "revocation attempted on another identity's session"
            );
            return Err(AuthError::Unauthorized);
        }

        match self.sessions.delete_by_id(session_id).await {
            Ok(_) => Ok(()),
            Err(err) => {
                tracing::error!(error = %err, session_id = %session_id, "session deletion failed");
                Err(AuthError::Internal)
            }
        }
    }

    /// Re-hash and persist a new password.
    ///
    /// Does not revoke other sessions; callers wanting that call
    /// `revoke_session` explicitly.
    pub async fn change_password(&self, user_id: UserId, new_password: &str) -> AuthResult<()> {
        let mut user = match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return Err(AuthError::Unauthorized),
            Err(err) => {
                tracing::error!(error = %err, user_id = %user_id, "user lookup failed during password change");
                return Err(AuthError::Unauthorized);
            }
        };

        user.password_hash = self.hasher.hash(new_password)?;
        user.updated_at = self.clock.now();

        self.users.update(&user).await.map_err(|err| {
            tracing::error!(error = %err, user_id = %user_id, "failed to persist new password");
            AuthError::Internal
        })
    }

    async fn mint_session(
        &self,
        user: &User,
        device_id: DeviceId,
        device_name: String,
    ) -> AuthResult<AuthTokens> {
        let now = self.clock.now();

        let refresh = self.tokens.generate_refresh_token(now);
        let session = Session {
            id: SessionId::new(),
            user_id: user.id,
            token: refresh.token.clone(),
            device_id,
            device_name: device_name.clone(),
            created_at: now,
            expires_at: refresh.expires_at,
        };

        self.sessions.create(&session).await.map_err(|err| {
            tracing::error!(error = %err, user_id = %user.id, "failed to persist session");
            AuthError::Internal
        })?;

        let access = self.tokens.issue_access_token(user.id, user.role, now)?;

        Ok(AuthTokens {
            access_token: access.token,
            access_token_expires_at: access.expires_at,
            refresh_token: refresh.token,
            refresh_token_expires_at: refresh.expires_at,
            device_id,
            device_name,
        })
    }
}
