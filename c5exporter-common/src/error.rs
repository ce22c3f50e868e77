use thiserror::Error;

/// Common error type for the C5 exporter.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed number: {0:?}")]
    MalformedNumber(String),

    #[error("Malformed size: {0:?}")]
    MalformedSize(String),

    #[error("Malformed counter line (expected {expected} fields, found {found}): {line:?}")]
    MalformedCounterLine {
        line: String,
        expected: usize,
        found: usize,
    },

    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    #[error("Upstream decode failure: {0}")]
    UpstreamDecodeFailure(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error was raised while parsing a payload, as opposed to fetching it.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedNumber(_) | Error::MalformedSize(_) | Error::MalformedCounterLine { .. }
        )
    }

    /// Whether the error was raised by the fetch layer.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Error::UpstreamUnreachable(_) | Error::UpstreamDecodeFailure(_)
        )
    }
}

/// Result type alias using the exporter's Error.
pub type Result<T> = std::result::Result<T, Error>;
