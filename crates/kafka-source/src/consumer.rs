use std::sync::Arc;

use console_types::{EventSender, EventSource, Header, Message, SourceError};
use rdkafka::consumer::{Consumer as RdkafkaConsumer, StreamConsumer as RdkafkaStreamConsumer};
use rdkafka::error::KafkaError;
use rdkafka::message::{Headers, Message as RdkafkaMessage};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::backoff::backoff_delay;
use crate::config::ConsumerConfig;
use crate::context::RebalanceContext;
use crate::error::{Error, Result};

type StreamConsumer = RdkafkaStreamConsumer<RebalanceContext>;

/// A connected, subscribed consumer that has not started pumping yet.
pub struct KafkaSource {
    consumer: Arc<StreamConsumer>,
    sender: EventSender,
    source: EventSource,
    config: ConsumerConfig,
}

/// Connect to the brokers and subscribe to the configured topic.
///
/// Failed attempts are logged and retried after an exponentially growing
/// delay. With `max_connect_attempts` unset this never gives up.
pub async fn connect(config: ConsumerConfig) -> Result<KafkaSource> {
    let (sender, source) = console_types::channel(config.channel_capacity);

    let mut attempt: u32 = 1;
    loop {
        match try_connect(&config, &sender).await {
            Ok(consumer) => {
                info!(
                    "Consumer connected to {} (group {}, topic {})",
                    config.brokers, config.group_id, config.topic
                );
                return Ok(KafkaSource {
                    consumer,
                    sender,
                    source,
                    config,
                });
            }
            Err(e) => {
                if config
                    .max_connect_attempts
                    .is_some_and(|max| attempt >= max)
                {
                    return Err(Error::ConnectExhausted {
                        attempts: attempt,
                        last: e.to_string(),
                    });
                }

                let delay = backoff_delay(attempt, config.initial_backoff, config.max_backoff);
                error!("Unable to start consumer: {e}");
                error!("Backing off for {} ms...", delay.as_millis());
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

async fn try_connect(config: &ConsumerConfig, sender: &EventSender) -> Result<Arc<StreamConsumer>> {
    if config.topic.is_empty() {
        return Err(Error::InvalidConfig("a topic is required".to_string()));
    }

    let context = RebalanceContext::new(sender.notifications.clone());
    let consumer: StreamConsumer = config
        .client_config()
        .create_with_context(context)
        .map_err(|e| Error::Consumer(format!("Failed to create consumer: {e}")))?;

    consumer
        .subscribe(&[&config.topic])
        .map_err(|e| Error::Consumer(format!("Failed to subscribe to topic: {e}")))?;

    // Creating the client doesn't touch the network; a metadata round trip
    // proves the brokers are reachable.
    let consumer = Arc::new(consumer);
    let probe = Arc::clone(&consumer);
    let topic = config.topic.clone();
    let timeout = config.metadata_timeout;
    tokio::task::spawn_blocking(move || probe.fetch_metadata(Some(&topic), timeout))
        .await
        .map_err(|e| Error::Consumer(format!("Metadata probe failed: {e}")))??;

    Ok(consumer)
}

impl KafkaSource {
    pub fn config(&self) -> &ConsumerConfig {
        &self.config
    }

    /// Start forwarding events and hand back the receiving side.
    ///
    /// The pump task stops once the dispatch loop drops the message receiver,
    /// and drops the rdkafka consumer on its way out.
    pub fn start(self) -> (EventSource, JoinHandle<()>) {
        let KafkaSource {
            consumer,
            sender,
            source,
            ..
        } = self;
        let handle = tokio::spawn(pump(consumer, sender));
        (source, handle)
    }
}

async fn pump(consumer: Arc<StreamConsumer>, sender: EventSender) {
    // The consumer context holds its own notification sender.
    let EventSender {
        messages, errors, ..
    } = sender;

    loop {
        let event = tokio::select! {
            _ = messages.closed() => break,
            received = consumer.recv() => received
                .map(|message| owned_message(&message))
                .map_err(|e| source_error(&e)),
        };

        let delivered = match event {
            Ok(message) => messages.send(message).await.is_ok(),
            Err(error) => errors.send(error).await.is_ok(),
        };
        if !delivered {
            break;
        }
    }

    consumer.unsubscribe();
    debug!("Consumer pump stopped");
}

/// The error as delivered on the error channel, tagged with the librdkafka
/// error code when there is one.
pub fn source_error(error: &KafkaError) -> SourceError {
    let reported = SourceError::new(error.to_string());
    match error.rdkafka_error_code() {
        Some(code) => reported.with_kind(format!("{code:?}")),
        None => reported,
    }
}

/// Copy an rdkafka message into an owned [`Message`].
///
/// A missing payload (tombstone) becomes an empty value, and a header without
/// a value becomes an empty header value.
pub fn owned_message<M: RdkafkaMessage>(message: &M) -> Message {
    let headers = message
        .headers()
        .map(|headers| {
            headers
                .iter()
                .map(|header| Header::new(header.key, header.value.unwrap_or_default()))
                .collect()
        })
        .unwrap_or_default();

    Message {
        topic: message.topic().to_string(),
        partition: message.partition(),
        offset: message.offset(),
        key: message.key().map(|k| k.to_vec()),
        timestamp: message.timestamp().to_millis(),
        headers,
        value: message.payload().unwrap_or_default().to_vec(),
    }
}
