//! Per-scrape polling of all configured C5 daemons.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::{self, JoinSet};
use tracing::{debug, error, warn};

use c5exporter_common::fields::parse_build_banner;
use c5exporter_common::{
    MetricSink, Result, clear_source_metrics, replace_source_metrics, source_metrics,
};

use crate::collector::SharedRegistry;
use crate::config::{SourceConfig, UpstreamConfig};
use crate::upstream::UpstreamClient;

/// Outcome of one scrape across all sources.
#[derive(Debug, Clone, Default)]
pub struct ScrapeReport {
    /// Sources that were updated, with the number of series written.
    pub succeeded: Vec<(String, usize)>,
    /// Sources that were cleared, with the reason.
    pub failed: Vec<(String, String)>,
}

impl ScrapeReport {
    /// Whether every source was updated.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Polls every source concurrently and writes the results into the registry.
pub struct Scraper {
    sources: Vec<SourceConfig>,
    client: UpstreamClient,
    registry: SharedRegistry,
}

/// Create a shareable scraper handle.
pub type SharedScraper = Arc<Scraper>;

impl Scraper {
    /// Create a scraper for the given sources.
    pub fn new(sources: Vec<SourceConfig>, client: UpstreamClient, registry: SharedRegistry) -> Self {
        Self {
            sources,
            client,
            registry,
        }
    }

    /// Create a scraper from the upstream configuration.
    pub fn from_config(config: &UpstreamConfig, registry: SharedRegistry) -> Result<Self> {
        let client = UpstreamClient::new(config.timeout())?;
        Ok(Self::new(config.sources.clone(), client, registry))
    }

    /// The registry the scraper writes into.
    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Fetch and process every source, returning once all of them are done.
    ///
    /// A failing source is cleared from the registry and never fails the scrape.
    pub async fn scrape(&self) -> ScrapeReport {
        let mut tasks = JoinSet::new();
        let mut prefixes = HashMap::with_capacity(self.sources.len());

        for source in &self.sources {
            let source = source.clone();
            let client = self.client.clone();
            let registry = self.registry.clone();
            let prefix = source.prefix.clone();

            let handle = tasks.spawn(async move {
                let outcome = process_source(&client, registry.as_ref(), &source).await;
                (source.prefix, outcome)
            });
            prefixes.insert(handle.id(), prefix);
        }

        let report = collect_outcomes(self.registry.as_ref(), tasks, prefixes).await;

        self.registry.record_scrape(report.failed.len());
        debug!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "Scrape finished"
        );

        report
    }
}

/// Wait for every source task and collect the outcomes.
///
/// A task that panicked is looked up in `prefixes` and its source cleared.
async fn collect_outcomes<S: MetricSink + ?Sized>(
    sink: &S,
    mut tasks: JoinSet<(String, Result<usize>)>,
    mut prefixes: HashMap<task::Id, String>,
) -> ScrapeReport {
    let mut report = ScrapeReport::default();

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((prefix, Ok(series))) => report.succeeded.push((prefix, series)),
            Ok((prefix, Err(e))) => report.failed.push((prefix, e.to_string())),
            Err(e) => match prefixes.remove(&e.id()) {
                Some(prefix) => {
                    error!(source = %prefix, error = %e, "Source task failed");
                    clear_source_metrics(sink, &prefix);
                    report.failed.push((prefix, e.to_string()));
                }
                None => {
                    error!(task = %e.id(), error = %e, "Unknown source task failed");
                }
            },
        }
    }

    report
}

/// Fetch one source and replace its metrics, or clear them if anything goes wrong.
///
/// Returns the number of series written.
pub async fn process_source<S: MetricSink + ?Sized>(
    client: &UpstreamClient,
    sink: &S,
    source: &SourceConfig,
) -> Result<usize> {
    let result = match client.fetch(&source.url).await {
        Ok(status) => {
            debug!(
                source = %source.prefix,
                version = parse_build_banner(&status.build_version),
                started = %status.startup_time,
                "Fetched status"
            );
            source_metrics(&source.prefix, &status)
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(metrics) => {
            replace_source_metrics(sink, &source.prefix, &metrics);
            Ok(metrics.len())
        }
        Err(e) => {
            warn!(
                source = %source.prefix,
                url = %source.url,
                error = %e,
                "Failed to process source"
            );
            clear_source_metrics(sink, &source.prefix);
            Err(e)
        }
    }
}
