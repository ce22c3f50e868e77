//! Metric registry that stores the latest values and renders them for Prometheus.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use c5exporter_common::{MetricSink, NamedMetricValue};
use c5exporter_common::naming::metric_family;

use crate::config::EXPORTER_PREFIX;

/// Prometheus metric type of a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrometheusType {
    Counter,
    Gauge,
}

impl PrometheusType {
    /// Determine the type from the family name, following the `_total` naming convention.
    pub fn from_family(family: &str) -> Self {
        if family.ends_with("_total") {
            PrometheusType::Counter
        } else {
            PrometheusType::Gauge
        }
    }

    /// Get the TYPE comment string for Prometheus exposition format.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrometheusType::Counter => "counter",
            PrometheusType::Gauge => "gauge",
        }
    }
}

/// Registry statistics.
#[derive(Debug, Clone, Default)]
pub struct RegistryStats {
    /// Scrapes served.
    pub scrapes: u64,
    /// Sources that failed to fetch or parse, summed over all scrapes.
    pub source_failures: u64,
    /// Series removed because their source failed.
    pub series_removed: u64,
}

/// Thread-safe registry of named metric values.
#[derive(Default)]
pub struct MetricRegistry {
    /// Metric values indexed by full name, labels included.
    metrics: RwLock<BTreeMap<String, u64>>,
    /// Statistics.
    stats: RwLock<RegistryStats>,
}

/// Create a shareable registry handle.
pub type SharedRegistry = Arc<MetricRegistry>;

impl MetricRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a metric.
    pub fn get(&self, name: &str) -> Option<u64> {
        self.metrics.read().get(name).copied()
    }

    /// Get the current number of stored series.
    pub fn series_count(&self) -> usize {
        self.metrics.read().len()
    }

    /// Get registry statistics.
    pub fn stats(&self) -> RegistryStats {
        self.stats.read().clone()
    }

    /// Account for a finished scrape.
    pub fn record_scrape(&self, failed_sources: usize) {
        let mut stats = self.stats.write();
        stats.scrapes += 1;
        stats.source_failures += failed_sources as u64;
    }

    /// Render metrics in Prometheus exposition format.
    pub fn render(&self) -> String {
        let metrics = self.metrics.read();
        let mut output = Vec::with_capacity(metrics.len() * 64);

        // Group series by family for TYPE comments
        let mut by_family: BTreeMap<&str, Vec<(&str, u64)>> = BTreeMap::new();
        for (name, value) in metrics.iter() {
            by_family
                .entry(metric_family(name))
                .or_default()
                .push((name.as_str(), *value));
        }

        for (family, series) in &by_family {
            writeln!(
                output,
                "# TYPE {} {}",
                family,
                PrometheusType::from_family(family).as_str()
            )
            .ok();

            for (name, value) in series {
                writeln!(output, "{} {}", name, value).ok();
            }
        }

        // Add registry stats as metrics
        let stats = self.stats.read();
        writeln!(output).ok();
        writeln!(output, "# TYPE {}_scrapes_total counter", EXPORTER_PREFIX).ok();
        writeln!(output, "{}_scrapes_total {}", EXPORTER_PREFIX, stats.scrapes).ok();

        writeln!(
            output,
            "# TYPE {}_source_failures_total counter",
            EXPORTER_PREFIX
        )
        .ok();
        writeln!(
            output,
            "{}_source_failures_total {}",
            EXPORTER_PREFIX, stats.source_failures
        )
        .ok();

        writeln!(output, "# TYPE {}_series gauge", EXPORTER_PREFIX).ok();
        writeln!(output, "{}_series {}", EXPORTER_PREFIX, metrics.len()).ok();

        String::from_utf8(output).unwrap_or_default()
    }
}

impl MetricSink for MetricRegistry {
    fn set_value(&self, name: &str, value: u64) {
        let mut metrics = self.metrics.write();
        match metrics.get_mut(name) {
            Some(current) => *current = value,
            None => {
                metrics.insert(name.to_string(), value);
            }
        }
    }

    fn remove_by_prefix(&self, prefix: &str) -> usize {
        let mut metrics = self.metrics.write();
        let before = metrics.len();

        metrics.retain(|name, _| {
            let keep = !name.starts_with(prefix);
            if !keep {
                trace!(name = %name, "Unregister metric");
            }
            keep
        });

        let removed = before - metrics.len();
        drop(metrics);

        if removed > 0 {
            self.stats.write().series_removed += removed as u64;
        }
        removed
    }

    fn replace_source(&self, prefix: &str, metrics: &[NamedMetricValue]) -> usize {
        let mut current = self.metrics.write();

        let mut stale = 0;
        current.retain(|name, _| {
            if !name.starts_with(prefix) {
                return true;
            }
            if !metrics.iter().any(|m| m.name == *name) {
                trace!(name = %name, "Unregister metric");
                stale += 1;
            }
            false
        });
        for metric in metrics {
            current.insert(metric.name.clone(), metric.value);
        }
        drop(current);

        if stale > 0 {
            self.stats.write().series_removed += stale as u64;
        }
        stale
    }

    fn list_names(&self) -> Vec<String> {
        self.metrics.read().keys().cloned().collect()
    }
}
