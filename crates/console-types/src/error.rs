//! Errors reported by the consumer source.

use thiserror::Error;

/// An error delivered on the consumer's error channel.
///
/// These never terminate the dispatch loop; they are logged and the loop
/// moves on. Whether the condition is fatal upstream is the source's call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SourceError {
    /// Short error class from the client library, e.g. `BrokerTransportFailure`
    pub kind: Option<String>,
    /// Human-readable description, usually the client library's own text.
    pub message: String,
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: None,
            message: message.into(),
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}
