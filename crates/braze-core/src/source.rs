//! Connection supervisor boundary.
//!
//! The dispatch engine does not own the persistent real-time connection. It
//! consumes decoded notifications through [`NotificationSource`] and learns
//! about connection liveness through [`Liveness`] callbacks. Reconnect policy
//! belongs entirely to the supervisor behind the trait; a source that simply
//! stops yielding is a safe state for the engine.

use async_trait::async_trait;

use crate::notification::Notification;

/// A sequence of decoded inbound notifications.
///
/// The run loop pulls from this until it returns `None`, which means the
/// supervisor has shut down for good (not a transient reconnect).
#[async_trait]
pub trait NotificationSource: Send {
    /// Waits for and returns the next decoded notification.
    async fn next(&mut self) -> Option<Notification>;

    /// Reports the supervisor's current view of the connection.
    fn liveness(&self) -> Liveness {
        Liveness::Connected
    }
}

/// Connection liveness signal from the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// The connection is up and notifications are flowing.
    Connected,
    /// The connection dropped; the supervisor is reconnecting.
    Reconnecting,
    /// The connection is gone and will not come back.
    Closed,
}

/// An in-process source backed by a tokio channel.
///
/// Connection supervisors push decoded notifications into the sender half;
/// the bot run loop consumes the receiver half. Dropping the sender ends the
/// stream.
pub struct ChannelSource {
    rx: tokio::sync::mpsc::Receiver<Notification>,
}

impl ChannelSource {
    /// Creates a bounded channel source, returning the push half alongside it.
    pub fn new(capacity: usize) -> (tokio::sync::mpsc::Sender<Notification>, Self) {
        let (tx, rx) = tokio::sync::mpsc::channel(capacity);
        (tx, Self { rx })
    }
}

#[async_trait]
impl NotificationSource for ChannelSource {
    async fn next(&mut self) -> Option<Notification> {
        self.rx.recv().await
    }

    fn liveness(&self) -> Liveness {
        if self.rx.is_closed() {
            Liveness::Closed
        } else {
            Liveness::Connected
        }
    }
}
