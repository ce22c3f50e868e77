//! HTTP client for the C5 status endpoints.

use std::time::Duration;

use reqwest::Client;
use tracing::trace;

use c5exporter_common::{Error, Result, StatusResponse};

/// Fetches status documents from C5 daemons.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
}

impl UpstreamClient {
    /// Create a client whose requests fail after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Fetch and decode the status document at `url`.
    ///
    /// There are no retries; a failed request is reported as is.
    pub async fn fetch(&self, url: &str) -> Result<StatusResponse> {
        let response = self.client.get(url).send().await.map_err(unreachable)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamUnreachable(format!(
                "{} returned status {}",
                url, status
            )));
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                unreachable(e)
            } else {
                Error::UpstreamDecodeFailure(e.to_string())
            }
        })?;
        trace!(url, bytes = body.len(), "Received status document");

        StatusResponse::from_json(&body).map_err(|e| Error::UpstreamDecodeFailure(e.to_string()))
    }
}

fn unreachable(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::UpstreamUnreachable("request timed out".to_string())
    } else {
        Error::UpstreamUnreachable(err.to_string())
    }
}
