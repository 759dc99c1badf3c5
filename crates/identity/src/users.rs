//! Account lifecycle: signup and profile lookup.

use std::sync::Arc;

use passgate_auth::{PasswordHasher, Role};
use passgate_core::{AuthError, AuthResult, Clock, UserId};
use passgate_events::EventBus;

use crate::events::UserCreated;
use crate::store::{IdentityStore, StoreError};
use crate::user::{PublicUser, User};

/// Creates accounts and serves profile reads.
pub struct UserService {
    users: Arc<dyn IdentityStore>,
    hasher: Arc<PasswordHasher>,
    bus: Arc<dyn EventBus<UserCreated>>,
    clock: Arc<dyn Clock>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn IdentityStore>,
        hasher: Arc<PasswordHasher>,
        bus: Arc<dyn EventBus<UserCreated>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            bus,
            clock,
        }
    }

    /// Create an account in the unverified, inactive state.
    ///
    /// New accounts always get the base role; elevation is an operator
    /// action, not a signup parameter.
    pub async fn signup(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> AuthResult<PublicUser> {
        let now = self.clock.now();
        let user = User {
            id: UserId::new(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            password_hash: self.hasher.hash(password)?,
            role: Role::User,
            is_active: false,
            is_email_verified: false,
            created_at: now,
            updated_at: now,
        };

        match self.users.create(&user).await {
            Ok(()) => {}
            Err(StoreError::Duplicate(_)) => return Err(AuthError::AlreadySignedUp),
            Err(err) => {
                tracing::error!(error = %err, "failed to persist signup");
                return Err(AuthError::Internal);
            }
        }

        if let Err(err) = self.bus.publish(UserCreated {
            user_id: user.id,
            email: user.email.clone(),
            full_name: user.full_name(),
            occurred_at: now,
        }) {
            tracing::warn!(error = %err, user_id = %user.id, "failed to publish signup event");
        }

        Ok(user.public())
    }

    /// The caller's own profile.
    pub async fn profile(&self, user_id: UserId) -> AuthResult<PublicUser> {
        match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => Ok(user.public()),
            Ok(None) => Err(AuthError::Unauthorized),
            Err(err) => {
                tracing::error!(error = %err, user_id = %user_id, "profile lookup failed");
                Err(AuthError::Internal)
            }
        }
    }
}
