//! Prometheus exporter for C5 telephony daemons.
//!
//! On every scrape of the metrics endpoint the exporter polls the status endpoint
//! of each configured daemon, converts the reported counters into metrics and
//! serves them in the Prometheus text format.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │   C5 daemons    │────>│     Scraper     │────>│   HTTP Server   │
//! │ (status pages)  │     │   (registry)    │     │   (/metrics)    │
//! └─────────────────┘     └─────────────────┘     └─────────────────┘
//! ```
//!
//! A daemon that cannot be reached or returns a malformed document has all of its
//! series removed; the other daemons are unaffected.
//!
//! # Usage
//!
//! ```bash
//! c5exporter --config config.json5
//! ```
//!
//! # Configuration
//!
//! See [`config::ExporterConfig`] for configuration options.

pub mod collector;
pub mod config;
pub mod http;
pub mod scrape;
pub mod upstream;

pub use collector::{MetricRegistry, SharedRegistry};
pub use config::ExporterConfig;
pub use http::HttpServer;
pub use scrape::{ScrapeReport, Scraper, SharedScraper};
pub use upstream::UpstreamClient;
