//! Command-line entry point for kafka-console-consumer
//!
//! # Usage Examples
//!
//! ```bash
//! # Print JSON messages from the latest offset
//! kafka-console-consumer \
//!   --bootstrap-server localhost:9092 \
//!   --topic orders \
//!   --type json
//!
//! # Replay an Avro topic from the beginning, expanding embedded JSON fields
//! kafka-console-consumer \
//!   --bootstrap-server broker-1:9093,broker-2:9093 \
//!   --topic payments \
//!   --type avro --schemas payment.avsc \
//!   --converter embedded-json \
//!   --from-beginning \
//!   --client-cert client.pem --client-key client.key --ca-cert ca.pem
//! ```
//!
//! Log verbosity follows `RUST_LOG` and defaults to `info`.

use std::sync::Arc;

use clap::Parser;
use console_types::TracingSink;
use kafka_console_consumer::{Cli, PluginRegistry};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let registry = PluginRegistry::with_builtins();

    kafka_console_consumer::run(cli, &registry, Arc::new(TracingSink)).await?;
    Ok(())
}
