//! Types shared across the kafka-console-consumer workspace.
//!
//! The consumer source produces [`Message`]s, [`Notification`]s and
//! [`SourceError`]s; decoders turn message values into [`DecodedValue`]s;
//! the dispatch loop reports everything through a [`LogSink`].
//!
//! ## Dependency Direction
//!
//! The source, decoder and dispatch crates all depend on this crate and never
//! on each other, so a decoder can be compiled and tested without rdkafka.

pub mod error;
pub mod message;
pub mod sink;
pub mod source;
pub mod value;

pub use error::SourceError;
pub use message::{Header, Message, Notification, TopicPartition};
pub use sink::{LogSink, MemorySink, TracingSink};
pub use source::{channel, EventSender, EventSource};
pub use value::DecodedValue;

// Re-exported so sink implementors don't need their own tracing dependency.
pub use tracing::Level;
