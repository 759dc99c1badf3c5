//! `passgate-events` — outbound event mechanics.
//!
//! The core publishes facts ("user.created") after the transactional write
//! commits; listeners consume them asynchronously and cannot influence the
//! publisher's success or failure.

pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, PublishError, Subscription};
pub use event::Event;
pub use in_memory_bus::InMemoryEventBus;
