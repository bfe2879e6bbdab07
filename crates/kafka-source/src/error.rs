use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    #[error("Consumer error: {0}")]
    Consumer(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unable to start consumer after {attempts} attempts: {last}")]
    ConnectExhausted { attempts: u32, last: String },

    #[error("Cannot read TLS file {path:?}: {source}")]
    TlsFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TLS configuration error: {0}")]
    Tls(String),
}

pub type Result<T> = std::result::Result<T, Error>;
