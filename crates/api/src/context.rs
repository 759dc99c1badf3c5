use passgate_auth::Role;
use passgate_core::UserId;

/// Authenticated identity for a request.
///
/// Inserted by the authentication middleware; present on every guarded route.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AuthContext {
    user_id: UserId,
    role: Role,
}

impl AuthContext {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }
}
