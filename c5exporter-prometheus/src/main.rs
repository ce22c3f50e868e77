//! Prometheus exporter for C5 telephony daemons.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};

use c5exporter_common::init_tracing;
use c5exporter_prometheus::{ExporterConfig, HttpServer, MetricRegistry, Scraper};

/// Prometheus exporter for C5 telephony daemons.
#[derive(Parser, Debug)]
#[command(name = "c5exporter")]
#[command(about = "Export C5 daemon counters as Prometheus metrics")]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON5 format).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP listen address (overrides config).
    #[arg(long)]
    listen: Option<String>,

    /// Enable debug logging.
    #[arg(short, long)]
    debug: bool,

    /// Log level (trace, debug, info, warn, error). Overrides config.
    #[arg(long)]
    log_level: Option<String>,
}

async fn wait_for_signal() -> anyhow::Result<&'static str> {
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                Ok("Ctrl+C")
            }
            _ = sigterm.recv() => Ok("SIGTERM"),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        Ok("Ctrl+C")
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => ExporterConfig::load_from_file(path)?,
        None => ExporterConfig::default(),
    };

    // Apply CLI overrides
    if let Some(listen) = args.listen {
        config.prometheus.listen = listen;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if args.debug {
        config.logging.level = "debug".to_string();
    }
    config.validate()?;

    init_tracing(&config.logging)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting C5 exporter");
    for source in &config.upstream.sources {
        info!(prefix = %source.prefix, url = %source.url, "Polling source");
    }

    let listen_addr: SocketAddr = config
        .prometheus
        .listen
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address: {}", e))?;

    // Create components
    let registry = Arc::new(MetricRegistry::new());
    let scraper = Arc::new(Scraper::from_config(&config.upstream, registry.clone())?);
    let http_server = HttpServer::new(scraper, listen_addr, config.prometheus.path.clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut http_task = tokio::spawn(async move { http_server.run(shutdown_rx).await });

    tokio::select! {
        signal = wait_for_signal() => {
            let signal = signal?;
            info!(signal, "Shutting down");
        }
        result = &mut http_task => {
            // The server only returns on its own when it failed to start
            return match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(e),
                Err(e) => Err(e.into()),
            };
        }
    }

    shutdown_tx.send(true)?;

    match tokio::time::timeout(Duration::from_secs(5), http_task).await {
        Ok(Ok(Err(e))) => error!("HTTP server error: {}", e),
        Ok(Err(e)) => error!("HTTP server task failed: {}", e),
        Err(_) => error!("HTTP server did not stop in time"),
        Ok(Ok(Ok(()))) => {}
    }

    let stats = registry.stats();
    info!(
        scrapes = stats.scrapes,
        source_failures = stats.source_failures,
        series_removed = stats.series_removed,
        series_count = registry.series_count(),
        "Final statistics"
    );

    info!("Exporter stopped");
    Ok(())
}
