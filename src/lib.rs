//! kafka-console-consumer: print the messages of a Kafka topic as JSON.
//!
//! The binary is a thin wrapper around [`run`], which validates the command
//! line, resolves the decoder and TLS settings, connects the consumer and
//! drives the dispatch loop until a shutdown signal arrives.

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use console_types::LogSink;
use dispatch::{Dispatcher, Summary};
use kafka_console_source::ConsumerConfig;
use tracing::{info, warn};

pub mod cli;
pub mod plugin;
pub mod tls;

pub use cli::{check_args, ArgsError, Cli};
pub use plugin::{Capability, Plugin, PluginError, PluginRegistry};

/// Run the consumer until the process is asked to stop.
///
/// Every startup problem (bad arguments, unknown plugins, an invalid schema,
/// TLS or connection failures) is returned before any message is read.
pub async fn run(cli: Cli, registry: &PluginRegistry, sink: Arc<dyn LogSink>) -> anyhow::Result<Summary> {
    run_until(cli, registry, sink, shutdown_signal()).await
}

/// Like [`run`], but stops when `shutdown` resolves instead of on a signal.
///
/// The same `shutdown` future is watched while connecting and while serving,
/// so a stop request made at any point after startup is seen.
pub async fn run_until<F>(
    cli: Cli,
    registry: &PluginRegistry,
    sink: Arc<dyn LogSink>,
    shutdown: F,
) -> anyhow::Result<Summary>
where
    F: Future<Output = ()>,
{
    check_args(&cli)?;

    let tls = tls::resolve_tls(&cli.kafka, cli.tls_configurator.as_deref(), registry)
        .context("Could not configure TLS")?;

    let decoder = registry
        .resolve_decoder(cli.msg_type(), cli.converter.as_deref(), Arc::clone(&sink))
        .context("Could not load the message decoder")?;
    let dispatcher =
        Dispatcher::new(decoder, cli.schemas(), sink).context("Could not initialize parser")?;

    let config = ConsumerConfig::from_config(&cli.kafka, tls);
    tokio::pin!(shutdown);
    let source = tokio::select! {
        source = kafka_console_source::connect(config) => source.context("Could not start consumer")?,
        _ = &mut shutdown => {
            info!("Interrupted before the consumer connected");
            return Ok(Summary::default());
        }
    };

    let (events, pump) = source.start();
    let mut handle = dispatcher.serve(events);

    tokio::select! {
        _ = &mut shutdown => info!("Shutting down..."),
        _ = handle.stopped() => {}
    }

    let summary = handle.shutdown().await?;
    pump.await.context("Consumer task failed")?;
    Ok(summary)
}

/// Resolves on Ctrl-C, or on SIGTERM, SIGHUP or SIGQUIT on unix.
pub async fn shutdown_signal() {
    tokio::select! {
        _ = interrupt() => {}
        _ = terminate() => {}
    }
}

async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Unable to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};

    let (Ok(mut term), Ok(mut hangup), Ok(mut quit)) = (
        signal(SignalKind::terminate()),
        signal(SignalKind::hangup()),
        signal(SignalKind::quit()),
    ) else {
        warn!("Unable to install signal handlers");
        return std::future::pending().await;
    };

    tokio::select! {
        _ = term.recv() => {}
        _ = hangup.recv() => {}
        _ = quit.recv() => {}
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await
}
