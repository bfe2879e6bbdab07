//! The logging capability handed to the dispatch loop and decoders.
//!
//! Nothing in the core reaches for a global logger. The process owns one
//! [`LogSink`] (normally [`TracingSink`]) and passes it down explicitly.

use std::sync::Mutex;

use tracing::Level;

/// Destination for the consumer's line-oriented output.
pub trait LogSink: Send + Sync {
    fn log(&self, level: Level, line: &str);

    fn debug(&self, line: &str) {
        self.log(Level::DEBUG, line);
    }

    fn info(&self, line: &str) {
        self.log(Level::INFO, line);
    }

    fn warn(&self, line: &str) {
        self.log(Level::WARN, line);
    }

    fn error(&self, line: &str) {
        self.log(Level::ERROR, line);
    }
}

/// Forwards every line to the `tracing` macro of the same level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: Level, line: &str) {
        if level == Level::ERROR {
            tracing::error!("{line}");
        } else if level == Level::WARN {
            tracing::warn!("{line}");
        } else if level == Level::INFO {
            tracing::info!("{line}");
        } else if level == Level::DEBUG {
            tracing::debug!("{line}");
        } else {
            tracing::trace!("{line}");
        }
    }
}

/// Keeps every line in memory, in the order it was logged.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<(Level, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded lines with their levels.
    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Snapshot of the recorded text only.
    pub fn messages(&self) -> Vec<String> {
        self.lines().into_iter().map(|(_, line)| line).collect()
    }

    /// Recorded lines at exactly `level`.
    pub fn at_level(&self, level: Level) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, line)| line)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn log(&self, level: Level, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((level, line.to_string()));
    }
}
