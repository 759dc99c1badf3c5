//! Event publishing/subscription abstraction.
//!
//! Deliberately lightweight: broadcast fan-out, at-least-once semantics,
//! no persistence. Listeners must be idempotent. The publisher's success
//! path never depends on delivery.

use std::sync::mpsc::Receiver;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// Internal subscriber registry is unusable (lock poisoning).
    #[error("event bus is poisoned")]
    Poisoned,
}

/// A subscription to an event stream.
///
/// Each subscription receives a copy of every message published after it was
/// created. Designed for single-threaded consumption (one listener loop per
/// subscription).
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// Publish/subscribe contract used by the services.
pub trait EventBus<M>: Send + Sync {
    fn publish(&self, message: M) -> Result<(), PublishError>;

    fn subscribe(&self) -> Subscription<M>;
}
