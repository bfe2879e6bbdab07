//! Consumer source for kafka-console-consumer, built on rdkafka.
//!
//! The source connects to the brokers (retrying with exponential backoff),
//! subscribes to a single topic, and feeds the dispatch loop through the
//! three channels of a [`console_types::EventSource`]:
//!
//! - messages, copied out of rdkafka into owned [`console_types::Message`]s
//! - consumer errors reported by `recv`
//! - rebalance notifications raised by the consumer context
//!
//! Offsets are committed by rdkafka's auto-commit; nothing is persisted here.

/// Exponential backoff arithmetic for connection attempts
pub mod backoff;

/// CLI-facing configuration and the resolved consumer configuration
pub mod config;

/// Connection, subscription and the message pump
pub mod consumer;

/// Consumer context that reports rebalances
pub mod context;
pub mod error;

/// TLS settings and the pluggable TLS configurator capability
pub mod tls;

pub use config::{Config, ConsumerConfig};
pub use consumer::{connect, KafkaSource};
pub use context::RebalanceContext;
pub use error::{Error, Result};
pub use tls::{TlsConfig, TlsConfigurator};
