//! The core of kafka-console-consumer: a single task that multiplexes the
//! consumer's event channels, decodes each message and prints it as JSON.
//!
//! ```text
//! EventSource ──▶ Dispatcher ──decode──▶ Presenter ──▶ LogSink
//!    messages       (one task)
//!    errors
//!    notifications
//! ```

/// The dispatch loop and its shutdown handle
pub mod dispatcher;
pub mod error;

/// Indented JSON output of decoded values
pub mod presenter;

pub use dispatcher::{Dispatcher, ShutdownHandle, Summary};
pub use error::{DispatchError, PresentError};
pub use presenter::Presenter;
