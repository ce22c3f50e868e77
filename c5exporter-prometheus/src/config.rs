//! Configuration for the C5 exporter.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub use c5exporter_common::{LogFormat, LoggingConfig};

/// Name prefix of the exporter's own metrics.
pub const EXPORTER_PREFIX: &str = "c5exporter";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] json5::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Complete exporter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Prometheus exporter settings.
    #[serde(default)]
    pub prometheus: PrometheusConfig,

    /// C5 daemons to poll.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Prometheus HTTP endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrometheusConfig {
    /// Address to listen on (default: "0.0.0.0:9055").
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Path for metrics endpoint (default: "/metrics").
    #[serde(default = "default_path")]
    pub path: String,
}

fn default_listen() -> String {
    "0.0.0.0:9055".to_string()
}

fn default_path() -> String {
    "/metrics".to_string()
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            path: default_path(),
        }
    }
}

/// Upstream status endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Timeout of a single status request (milliseconds).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Daemons to poll on every scrape.
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::new(
            "sipproxyd",
            "http://127.0.0.1:9980/c5/proxy/commands?49&1&-v",
        ),
        SourceConfig::new(
            "acdqueued",
            "http://127.0.0.1:9982/c5/proxy/commands?49&1&-v",
        ),
        SourceConfig::new(
            "registrard",
            "http://127.0.0.1:9984/c5/proxy/commands?49&1&-v",
        ),
    ]
}

impl UpstreamConfig {
    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            sources: default_sources(),
        }
    }
}

/// A single C5 daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Metric name prefix, also identifies the source.
    pub prefix: String,

    /// Status endpoint URL.
    pub url: String,
}

impl SourceConfig {
    pub fn new(prefix: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            url: url.into(),
        }
    }
}

/// Check that a prefix is a lower-case Prometheus name.
fn is_valid_prefix(prefix: &str) -> bool {
    let mut chars = prefix.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

impl ExporterConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON5 string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: ExporterConfig = json5::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .prometheus
            .listen
            .parse::<std::net::SocketAddr>()
            .is_err()
        {
            return Err(ConfigError::Validation(format!(
                "Invalid listen address: {}",
                self.prometheus.listen
            )));
        }

        if !self.prometheus.path.starts_with('/') {
            return Err(ConfigError::Validation(
                "Metrics path must start with /".to_string(),
            ));
        }

        if self.upstream.timeout_ms == 0 {
            return Err(ConfigError::Validation("timeout_ms must be > 0".to_string()));
        }

        if self.upstream.sources.is_empty() {
            return Err(ConfigError::Validation(
                "At least one source must be configured".to_string(),
            ));
        }

        for (i, source) in self.upstream.sources.iter().enumerate() {
            if !is_valid_prefix(&source.prefix) {
                return Err(ConfigError::Validation(format!(
                    "Invalid source prefix '{}': expected lower-case letters, digits and '_'",
                    source.prefix
                )));
            }

            if source.prefix.starts_with(EXPORTER_PREFIX)
                || EXPORTER_PREFIX.starts_with(&source.prefix)
            {
                return Err(ConfigError::Validation(format!(
                    "Source prefix '{}' clashes with the exporter's own metrics",
                    source.prefix
                )));
            }

            if !source.url.starts_with("http://") && !source.url.starts_with("https://") {
                return Err(ConfigError::Validation(format!(
                    "Invalid URL for source '{}': {}",
                    source.prefix, source.url
                )));
            }

            // Clearing a source removes every name starting with its prefix.
            for other in &self.upstream.sources[i + 1..] {
                if other.prefix.starts_with(&source.prefix)
                    || source.prefix.starts_with(&other.prefix)
                {
                    return Err(ConfigError::Validation(format!(
                        "Source prefixes '{}' and '{}' overlap",
                        source.prefix, other.prefix
                    )));
                }
            }
        }

        Ok(())
    }
}
