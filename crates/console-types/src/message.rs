//! Kafka message and consumer-group notification types.
//!
//! These are owned copies of what the client library hands out, so they can
//! cross a channel and outlive the consumer's internal buffers.

use std::fmt;

/// A single message header. Keys and values are raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl Header {
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A consumed Kafka message.
///
/// Produced by the consumer source, consumed exactly once by the dispatch
/// loop and never mutated in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Kafka topic name
    pub topic: String,
    /// Kafka partition number
    pub partition: i32,
    /// Kafka offset within the partition
    pub offset: i64,
    /// Message key (if any)
    pub key: Option<Vec<u8>>,
    /// Message timestamp in milliseconds since epoch (if available)
    pub timestamp: Option<i64>,
    /// Headers in the order the broker delivered them
    pub headers: Vec<Header>,
    /// Raw payload. Tombstones carry an empty payload.
    pub value: Vec<u8>,
}

impl Message {
    /// Create a message with only an offset and a payload set.
    pub fn new(offset: i64, value: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: String::new(),
            partition: 0,
            offset,
            key: None,
            timestamp: None,
            headers: Vec::new(),
            value: value.into(),
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>, partition: i32) -> Self {
        self.topic = topic.into();
        self.partition = partition;
        self
    }

    pub fn with_header(mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        self.headers.push(Header::new(key, value));
        self
    }
}

/// A topic/partition pair named in a rebalance notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicPartition {
    pub topic: String,
    pub partition: i32,
}

impl fmt::Display for TopicPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.topic, self.partition)
    }
}

/// Consumer-group rebalance notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Partitions newly assigned to this consumer
    Assigned(Vec<TopicPartition>),
    /// Partitions taken away from this consumer
    Revoked(Vec<TopicPartition>),
    /// The rebalance itself failed
    Failed(String),
}
