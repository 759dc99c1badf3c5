//! Domain events emitted by the identity services.

use chrono::{DateTime, Utc};

use passgate_core::UserId;
use passgate_events::Event;

/// Emitted after a signup is persisted. Delivery is best-effort; a lost
/// event never rolls the signup back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCreated {
    pub user_id: UserId,
    pub email: String,
    pub full_name: String,
    pub occurred_at: DateTime<Utc>,
}

impl Event for UserCreated {
    fn event_type(&self) -> &'static str {
        "user.created"
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
