//! C5 exporter common library
//!
//! This crate turns the status documents of C5 telephony daemons into named metric values:
//!
//! - [`scalar`] - Integer, byte size and state word parsers
//! - [`fields`] - Build banner and heap health parsers
//! - [`counters`] - Event and usage counter line parsers
//! - [`block`] - Section-aware interpretation of the counter listing
//! - [`status`] - The decoded status document
//! - [`naming`] - Metric naming and conversion to metric values
//! - [`sink`] - Writing values into a metric registry
//! - [`config`] - Logging configuration
//! - [`error`] - Error types

pub mod block;
pub mod config;
pub mod counters;
pub mod error;
pub mod fields;
pub mod naming;
pub mod scalar;
pub mod sink;
pub mod status;

// Re-export commonly used types at the crate root
pub use block::classify_block;
pub use config::{LogFormat, LoggingConfig};
pub use counters::{Counter, EventCounter, UsageCounter};
pub use error::{Error, Result};
pub use fields::MemoryHealth;
pub use naming::{NamedMetricValue, build_metric_name, source_metrics};
pub use scalar::ProcessState;
pub use sink::{
    MetricSink, clear_source_metrics, record_all, record_counter, record_usage,
    replace_source_metrics,
};
pub use status::{CounterEntry, Section, StatusResponse};

/// Initialize tracing with the given configuration.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
    }

    Ok(())
}
