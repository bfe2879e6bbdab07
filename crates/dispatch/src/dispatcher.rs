//! The dispatch loop.
//!
//! One task owns the [`EventSource`] and the decoder and services one event
//! per `select!` round. Handling an event never overlaps with handling
//! another, so decoders need no locking for per-message work.
//!
//! The loop has two states. It is running from the moment [`Dispatcher::serve`]
//! spawns it, and stops when the [`ShutdownHandle`] fires, when the handle is
//! dropped, or when all three event channels have closed. A single closed
//! channel only takes that channel out of the select.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use console_types::{EventSource, LogSink, Message, Notification, SourceError};
use decoders::Decoder;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::Result;
use crate::presenter::Presenter;

/// Counters reported when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Messages received, whether or not they decoded
    pub processed: u64,
    /// Messages that failed to decode or print
    pub failed: u64,
    /// Errors received from the consumer
    pub errors: u64,
    /// Rebalance notifications received
    pub notifications: u64,
}

/// Handle to a running dispatch loop.
///
/// [`ShutdownHandle::shutdown`] takes the handle by value, so the stop signal
/// can be sent at most once.
pub struct ShutdownHandle {
    signal: oneshot::Sender<()>,
    task: JoinHandle<Summary>,
}

impl ShutdownHandle {
    /// Ask the loop to stop and wait for its summary.
    ///
    /// If the loop already stopped on its own (all channels closed) this just
    /// collects the summary.
    pub async fn shutdown(self) -> Result<Summary> {
        // The receiver is gone if the loop already finished; nothing to do.
        let _ = self.signal.send(());
        Ok(self.task.await?)
    }

    /// Resolves once the loop has stopped by itself.
    pub async fn stopped(&mut self) {
        self.signal.closed().await;
    }

    /// Whether the loop task has already returned.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// A validated decoder waiting for an event source.
pub struct Dispatcher<D> {
    decoder: D,
    sink: Arc<dyn LogSink>,
    presenter: Presenter,
}

/// The loop's state while running. Owns the source and the decoder.
struct Running<D> {
    source: EventSource,
    decoder: D,
    sink: Arc<dyn LogSink>,
    presenter: Presenter,
}

impl<D: Decoder + 'static> Dispatcher<D> {
    /// Validate the decoder against `schemas` and build the dispatcher.
    ///
    /// A validation failure is returned as-is; it is a startup error and
    /// nothing is started.
    pub fn new(mut decoder: D, schemas: &str, sink: Arc<dyn LogSink>) -> decoders::Result<Self> {
        decoder.validate_schemas(schemas)?;
        Ok(Self {
            decoder,
            presenter: Presenter::new(Arc::clone(&sink)),
            sink,
        })
    }

    /// Spawn the loop over `source` on the current tokio runtime and return
    /// immediately.
    pub fn serve(self, source: EventSource) -> ShutdownHandle {
        let (signal, shutdown) = oneshot::channel();
        let running = Running {
            source,
            decoder: self.decoder,
            sink: self.sink,
            presenter: self.presenter,
        };
        let task = tokio::spawn(running.run(shutdown));
        ShutdownHandle { signal, task }
    }
}

impl<D: Decoder + 'static> Running<D> {
    async fn run(mut self, mut shutdown: oneshot::Receiver<()>) -> Summary {
        debug!("Dispatch loop started");
        let mut summary = Summary::default();
        let mut messages_open = true;
        let mut errors_open = true;
        let mut notifications_open = true;

        loop {
            // A pending shutdown wins over any event that is also ready.
            if !matches!(shutdown.try_recv(), Err(oneshot::error::TryRecvError::Empty)) {
                break;
            }
            if !messages_open && !errors_open && !notifications_open {
                self.sink.warn("All consumer channels closed");
                break;
            }

            tokio::select! {
                _ = &mut shutdown => break,
                message = self.source.messages.recv(), if messages_open => match message {
                    Some(message) => self.handle_message(message, &mut summary),
                    None => {
                        messages_open = false;
                        debug!("Message channel closed");
                    }
                },
                error = self.source.errors.recv(), if errors_open => match error {
                    Some(error) => self.handle_error(error, &mut summary),
                    None => {
                        errors_open = false;
                        debug!("Error channel closed");
                    }
                },
                notification = self.source.notifications.recv(), if notifications_open => match notification {
                    Some(notification) => self.handle_notification(notification, &mut summary),
                    None => {
                        notifications_open = false;
                        debug!("Notification channel closed");
                    }
                },
            }
        }

        self.sink.info(&format!(
            "Processed a total of {} messages.",
            summary.processed
        ));
        // Dropping self releases the decoder and closes the receivers, which
        // in turn lets the consumer source shut down.
        summary
    }

    fn handle_message(&self, message: Message, summary: &mut Summary) {
        summary.processed += 1;

        self.sink.info(&format!("Offset: {}", message.offset));
        self.sink.info("Headers:");
        for header in &message.headers {
            self.sink.info(&format!(
                "\t{}: {}",
                String::from_utf8_lossy(&header.key),
                String::from_utf8_lossy(&header.value)
            ));
        }

        // Decoders may come from outside this crate; a panic in one must not
        // take the loop down with it.
        let decoded = panic::catch_unwind(AssertUnwindSafe(|| self.decoder.decode(&message.value)));
        match decoded {
            Ok(Ok(value)) => {
                if self.presenter.present(&value).is_err() {
                    summary.failed += 1;
                }
            }
            Ok(Err(e)) => {
                summary.failed += 1;
                self.sink.error(&format!("Error decoding message: {e}"));
            }
            Err(_) => {
                summary.failed += 1;
                self.sink.error(&format!(
                    "Error decoding message: decoder panicked at offset {}",
                    message.offset
                ));
            }
        }
    }

    fn handle_error(&self, error: SourceError, summary: &mut Summary) {
        summary.errors += 1;
        self.sink.error(&format!("Error: {error}"));
    }

    fn handle_notification(&self, notification: Notification, summary: &mut Summary) {
        summary.notifications += 1;
        self.sink.warn(&format!("Rebalanced: {notification:?}"));
    }
}
