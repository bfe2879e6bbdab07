use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use rdkafka::config::ClientConfig;
use uuid::Uuid;

use crate::tls::TlsConfig;

/// Command-line configuration for the Kafka source.
#[derive(Debug, Clone, Parser)]
pub struct Config {
    /// Comma separated Kafka broker URLs
    #[clap(long = "bootstrap-server", env = "KAFKA_BOOTSTRAP_SERVER", value_delimiter = ',')]
    pub brokers: Vec<String>,
    /// Topic name
    #[clap(long, env = "KAFKA_TOPIC")]
    pub topic: Option<String>,
    /// Optional, the Kafka group id. A random one is generated when absent.
    #[clap(long = "group", env = "KAFKA_GROUP")]
    pub group_id: Option<String>,
    /// Optional, start at the earliest offset instead of the latest
    #[clap(long)]
    pub from_beginning: bool,
    /// Session timeout in milliseconds
    #[clap(long, default_value = "6000")]
    pub session_timeout_ms: String,
    /// Capacity of the message and error channels feeding the dispatch loop
    #[clap(long, default_value_t = 100)]
    pub channel_capacity: usize,
    /// First connection backoff is twice this many milliseconds
    #[clap(long, default_value_t = 100)]
    pub initial_backoff_ms: u64,
    /// Upper bound on a single connection backoff, in milliseconds
    #[clap(long, default_value_t = 30_000)]
    pub max_backoff_ms: u64,
    /// Give up connecting after this many attempts (retries forever if unset)
    #[clap(long)]
    pub max_connect_attempts: Option<u32>,
    /// Optional, client certificate path for TLS
    #[clap(long)]
    pub client_cert: Option<PathBuf>,
    /// Optional, client key path for TLS
    #[clap(long)]
    pub client_key: Option<PathBuf>,
    /// Optional, CA certificate path for TLS
    #[clap(long)]
    pub ca_cert: Option<PathBuf>,
}

impl Config {
    /// All three TLS files, if every one of them was given.
    pub fn tls_files(&self) -> Option<(&PathBuf, &PathBuf, &PathBuf)> {
        match (&self.client_cert, &self.client_key, &self.ca_cert) {
            (Some(cert), Some(key), Some(ca)) => Some((cert, key, ca)),
            _ => None,
        }
    }
}

/// Resolved configuration for the rdkafka consumer.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Kafka brokers (comma-separated list)
    pub brokers: String,
    /// Consumer group ID
    pub group_id: String,
    /// Topic to consume from
    pub topic: String,
    /// Auto offset reset strategy ("earliest" or "latest")
    pub auto_offset_reset: String,
    /// Session timeout in milliseconds
    pub session_timeout_ms: String,
    /// Capacity of the message and error channels
    pub channel_capacity: usize,
    /// Base connection backoff
    pub initial_backoff: Duration,
    /// Cap on a single connection backoff
    pub max_backoff: Duration,
    /// Connection attempts before giving up; `None` retries forever
    pub max_connect_attempts: Option<u32>,
    /// How long a connectivity probe waits for broker metadata
    pub metadata_timeout: Duration,
    /// TLS settings, if the connection is encrypted
    pub tls: Option<TlsConfig>,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            group_id: Uuid::new_v4().to_string(),
            topic: "".to_string(),
            auto_offset_reset: "latest".to_string(),
            session_timeout_ms: "6000".to_string(),
            channel_capacity: 100,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(30),
            max_connect_attempts: None,
            metadata_timeout: Duration::from_secs(5),
            tls: None,
        }
    }
}

impl ConsumerConfig {
    /// Build the consumer configuration from validated CLI options.
    pub fn from_config(config: &Config, tls: Option<TlsConfig>) -> Self {
        let group_id = config
            .group_id
            .clone()
            .filter(|group| !group.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let auto_offset_reset = if config.from_beginning {
            "earliest"
        } else {
            "latest"
        };

        Self {
            brokers: config.brokers.join(","),
            group_id,
            topic: config.topic.clone().unwrap_or_default(),
            auto_offset_reset: auto_offset_reset.to_string(),
            session_timeout_ms: config.session_timeout_ms.clone(),
            channel_capacity: config.channel_capacity,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
            max_connect_attempts: config.max_connect_attempts,
            tls,
            ..Default::default()
        }
    }

    /// The rdkafka client configuration for this consumer.
    pub fn client_config(&self) -> ClientConfig {
        let mut client = ClientConfig::new();
        client
            .set("bootstrap.servers", &self.brokers)
            .set("group.id", &self.group_id)
            .set("enable.auto.commit", "true")
            .set("auto.offset.reset", &self.auto_offset_reset)
            .set("session.timeout.ms", &self.session_timeout_ms)
            .set("enable.partition.eof", "false");

        if let Some(tls) = &self.tls {
            tls.apply(&mut client);
        }
        client
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn cli(args: &[&str]) -> Config {
        let mut argv = vec!["test"];
        argv.extend_from_slice(args);
        Config::parse_from(argv)
    }

    #[test]
    fn test_brokers_are_comma_separated() {
        let config = cli(&["--bootstrap-server", "a:9092,b:9092", "--topic", "events"]);
        assert_eq!(config.brokers, vec!["a:9092", "b:9092"]);

        let consumer = ConsumerConfig::from_config(&config, None);
        assert_eq!(consumer.brokers, "a:9092,b:9092");
        assert_eq!(consumer.topic, "events");
    }

    #[test]
    fn test_from_beginning_sets_earliest() {
        let consumer = ConsumerConfig::from_config(&cli(&["--from-beginning"]), None);
        assert_eq!(consumer.auto_offset_reset, "earliest");

        let consumer = ConsumerConfig::from_config(&cli(&[]), None);
        assert_eq!(consumer.auto_offset_reset, "latest");
    }

    #[test]
    fn test_group_generated_when_missing() {
        let first = ConsumerConfig::from_config(&cli(&[]), None);
        let second = ConsumerConfig::from_config(&cli(&["--group", ""]), None);
        assert!(Uuid::parse_str(&first.group_id).is_ok());
        assert!(Uuid::parse_str(&second.group_id).is_ok());
        assert_ne!(first.group_id, second.group_id);

        let named = ConsumerConfig::from_config(&cli(&["--group", "readers"]), None);
        assert_eq!(named.group_id, "readers");
    }

    #[test]
    fn test_backoff_options() {
        let config = cli(&[
            "--initial-backoff-ms",
            "50",
            "--max-backoff-ms",
            "1000",
            "--max-connect-attempts",
            "3",
        ]);
        let consumer = ConsumerConfig::from_config(&config, None);
        assert_eq!(consumer.initial_backoff, Duration::from_millis(50));
        assert_eq!(consumer.max_backoff, Duration::from_secs(1));
        assert_eq!(consumer.max_connect_attempts, Some(3));
    }

    #[test]
    fn test_client_config_properties() {
        let consumer = ConsumerConfig::from_config(
            &cli(&["--bootstrap-server", "k:9092", "--topic", "t", "--group", "g"]),
            None,
        );
        let client = consumer.client_config();
        assert_eq!(client.get("bootstrap.servers"), Some("k:9092"));
        assert_eq!(client.get("group.id"), Some("g"));
        assert_eq!(client.get("auto.offset.reset"), Some("latest"));
        assert_eq!(client.get("security.protocol"), None);
    }

    #[test]
    fn test_client_config_with_tls() {
        let mut properties = BTreeMap::new();
        properties.insert("ssl.ca.location".to_string(), "/etc/ca.pem".to_string());
        let tls = TlsConfig::from_properties(properties);

        let client = ConsumerConfig::from_config(&cli(&[]), Some(tls)).client_config();
        assert_eq!(client.get("security.protocol"), Some("ssl"));
        assert_eq!(client.get("ssl.ca.location"), Some("/etc/ca.pem"));
    }

    #[test]
    fn test_tls_files_need_all_three() {
        assert!(cli(&["--client-cert", "c", "--client-key", "k"])
            .tls_files()
            .is_none());
        assert!(cli(&["--client-cert", "c", "--client-key", "k", "--ca-cert", "a"])
            .tls_files()
            .is_some());
    }
}
