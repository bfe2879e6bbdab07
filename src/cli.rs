//! Command-line surface and argument validation.

use clap::Parser;
use kafka_console_source::Config;
use thiserror::Error;

use crate::plugin::SUPPORTED_TYPES;

#[derive(Parser, Debug, Clone)]
#[command(name = "kafka-console-consumer")]
#[command(about = "Consume a Kafka topic and print every message as JSON")]
#[command(long_about = None)]
pub struct Cli {
    /// Kafka source configuration
    #[command(flatten)]
    pub kafka: Config,

    /// Message type: a built-in type name or a registered plugin name
    #[arg(long = "type", env = "KAFKA_MESSAGE_TYPE", long_help = type_help())]
    pub msg_type: Option<String>,

    /// If the message type uses schemas, pass them here
    #[arg(long)]
    pub schemas: Option<String>,

    /// Optional, a converter plugin for additional Avro field conversion
    #[arg(long)]
    pub converter: Option<String>,

    /// Optional, a TLS configurator plugin that supplies TLS settings
    #[arg(long)]
    pub tls_configurator: Option<String>,
}

fn type_help() -> String {
    format!(
        "Pass the supported type name here or the name of a registered plugin. \
         Out of the box supported types are {}",
        SUPPORTED_TYPES.join(", ")
    )
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ArgsError {
    #[error("at least one broker URL is required")]
    NoBrokers,

    #[error("a topic is required")]
    NoTopic,

    #[error("a message type or path to type plugin is required")]
    NoType,

    #[error("a schema is required for message type Avro")]
    NoSchemas,
}

impl Cli {
    /// The message type, or "" if none was given.
    pub fn msg_type(&self) -> &str {
        self.msg_type.as_deref().unwrap_or_default()
    }

    /// The schema specification, or "" if none was given.
    pub fn schemas(&self) -> &str {
        self.schemas.as_deref().unwrap_or_default()
    }
}

/// Check the required options, in the order a user would fix them.
pub fn check_args(cli: &Cli) -> Result<(), ArgsError> {
    if cli.kafka.brokers.iter().all(|broker| broker.trim().is_empty()) {
        return Err(ArgsError::NoBrokers);
    }

    if cli.kafka.topic.as_deref().unwrap_or_default().is_empty() {
        return Err(ArgsError::NoTopic);
    }

    if cli.msg_type().is_empty() {
        return Err(ArgsError::NoType);
    }

    if cli.msg_type().eq_ignore_ascii_case("avro") && cli.schemas().is_empty() {
        return Err(ArgsError::NoSchemas);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["kafka-console-consumer"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_check_args_ok() {
        let cli = parse(&["--bootstrap-server", "k:9092", "--topic", "t", "--type", "json"]);
        assert_eq!(check_args(&cli), Ok(()));
    }

    #[test]
    fn test_check_args_missing_brokers() {
        let cli = parse(&["--topic", "t", "--type", "json"]);
        assert_eq!(check_args(&cli), Err(ArgsError::NoBrokers));

        let cli = parse(&["--bootstrap-server", "", "--topic", "t", "--type", "json"]);
        assert_eq!(check_args(&cli), Err(ArgsError::NoBrokers));
    }

    #[test]
    fn test_check_args_missing_topic() {
        let cli = parse(&["--bootstrap-server", "k:9092", "--type", "json"]);
        assert_eq!(check_args(&cli), Err(ArgsError::NoTopic));
    }

    #[test]
    fn test_check_args_missing_type() {
        let cli = parse(&["--bootstrap-server", "k:9092", "--topic", "t"]);
        assert_eq!(check_args(&cli), Err(ArgsError::NoType));
    }

    #[test]
    fn test_check_args_avro_needs_schemas() {
        let cli = parse(&["--bootstrap-server", "k:9092", "--topic", "t", "--type", "AVRO"]);
        assert_eq!(check_args(&cli), Err(ArgsError::NoSchemas));
        assert_eq!(
            ArgsError::NoSchemas.to_string(),
            "a schema is required for message type Avro"
        );

        let cli = parse(&[
            "--bootstrap-server",
            "k:9092",
            "--topic",
            "t",
            "--type",
            "avro",
            "--schemas",
            "person.avsc",
        ]);
        assert_eq!(check_args(&cli), Ok(()));
    }
}
