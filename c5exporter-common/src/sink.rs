//! Writing metric values into a named-metric registry.

use tracing::{debug, trace};

use crate::counters::{EventCounter, UsageCounter};
use crate::naming::{NamedMetricValue, event_metrics, usage_metrics};

/// A registry of named metric values.
///
/// Implementations synchronize internally; every method takes `&self` so the
/// registry can be shared between concurrently processed sources.
pub trait MetricSink: Send + Sync {
    /// Set the value of a metric, creating it if needed.
    fn set_value(&self, name: &str, value: u64);

    /// Remove every metric whose name starts with `prefix`, returning how many were removed.
    fn remove_by_prefix(&self, prefix: &str) -> usize;

    /// Replace every metric starting with `prefix` by `metrics` in one step.
    ///
    /// Readers see either the old or the new set, never a mix. Names the source no
    /// longer reports are gone afterwards. Returns how many such stale names were removed.
    fn replace_source(&self, prefix: &str, metrics: &[NamedMetricValue]) -> usize;

    /// Names of all registered metrics.
    fn list_names(&self) -> Vec<String>;
}

/// Write all values of an event counter.
pub fn record_counter<S: MetricSink + ?Sized>(sink: &S, prefix: &str, counter: &EventCounter) {
    record_all(sink, &event_metrics(prefix, counter));
}

/// Write all values of a usage counter.
pub fn record_usage<S: MetricSink + ?Sized>(sink: &S, prefix: &str, counter: &UsageCounter) {
    record_all(sink, &usage_metrics(prefix, counter));
}

/// Write a batch of metric values.
pub fn record_all<S: MetricSink + ?Sized>(sink: &S, metrics: &[NamedMetricValue]) {
    for metric in metrics {
        trace!(name = %metric.name, value = metric.value, "Set metric");
        sink.set_value(&metric.name, metric.value);
    }
}

/// Publish the complete metric set of a source, dropping names it no longer reports.
pub fn replace_source_metrics<S: MetricSink + ?Sized>(
    sink: &S,
    prefix: &str,
    metrics: &[NamedMetricValue],
) -> usize {
    let stale = sink.replace_source(prefix, metrics);
    if stale > 0 {
        debug!(prefix, stale, "Dropped series no longer reported");
    }
    trace!(prefix, count = metrics.len(), "Replaced source metrics");
    stale
}

/// Remove every metric of a source so it disappears from the output.
pub fn clear_source_metrics<S: MetricSink + ?Sized>(sink: &S, prefix: &str) -> usize {
    let removed = sink.remove_by_prefix(prefix);
    debug!(prefix, removed, "Cleared source metrics");
    removed
}
