//! The three event channels a consumer source exposes.
//!
//! A source pushes into an [`EventSender`]; the dispatch loop owns the
//! matching [`EventSource`]. Dropping every sender of a channel closes it,
//! which is how a source says no more events of that kind will arrive.

use tokio::sync::mpsc;

use crate::error::SourceError;
use crate::message::{Message, Notification};

/// Receiving half: messages, consumer errors and rebalance notifications.
#[derive(Debug)]
pub struct EventSource {
    pub messages: mpsc::Receiver<Message>,
    pub errors: mpsc::Receiver<SourceError>,
    pub notifications: mpsc::UnboundedReceiver<Notification>,
}

/// Sending half, held by whatever feeds the dispatch loop.
///
/// Notifications are unbounded because rebalance callbacks run synchronously
/// inside the client library and can't wait for capacity.
#[derive(Debug, Clone)]
pub struct EventSender {
    pub messages: mpsc::Sender<Message>,
    pub errors: mpsc::Sender<SourceError>,
    pub notifications: mpsc::UnboundedSender<Notification>,
}

/// Create a connected sender/source pair. `capacity` bounds the message and
/// error channels and is raised to 1 if zero.
pub fn channel(capacity: usize) -> (EventSender, EventSource) {
    let capacity = capacity.max(1);
    let (messages_tx, messages_rx) = mpsc::channel(capacity);
    let (errors_tx, errors_rx) = mpsc::channel(capacity);
    let (notifications_tx, notifications_rx) = mpsc::unbounded_channel();

    (
        EventSender {
            messages: messages_tx,
            errors: errors_tx,
            notifications: notifications_tx,
        },
        EventSource {
            messages: messages_rx,
            errors: errors_rx,
            notifications: notifications_rx,
        },
    )
}
