use thiserror::Error;

/// The primary error type for all fallible operations in this crate.
///
/// Only the caller-contract variants ([`QfError::is_fatal`]) ever escape the public fetch
/// methods. Transport and payload problems are logged and turned into empty results at
/// the parser boundary, so a batch is never aborted by a single bad source.
#[derive(Debug, Error)]
pub enum QfError {
    /// An error occurred during an HTTP request.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A provided URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The server returned an unsuccessful HTTP status code.
    #[error("Unexpected response status: {status} at {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The URL that returned the error.
        url: String,
    },

    /// A custom transport failed without a more specific cause.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The upstream payload could not be parsed.
    #[error("malformed upstream payload: {0}")]
    Parse(String),

    /// The response records could not be correlated with the requested symbols.
    #[error("protocol mismatch: {0}")]
    ProtocolMismatch(String),

    /// The index frequency has no minute-feed sampling interval.
    #[error("unsupported sampling frequency: {0}")]
    UnsupportedFrequency(String),

    /// A snapshot detail level outside `0..=2` was requested.
    #[error("invalid detail level {0}: expected 0 (fields), 1 (light) or 2 (heavy)")]
    InvalidDetailLevel(u8),

    /// Every requested field-query field was unsupported.
    #[error("no supported field left in request (rejected: {rejected:?})")]
    EmptyFieldSet {
        /// The field names that were removed from the request.
        rejected: Vec<String>,
    },

    /// The caller supplied inconsistent or empty parameters.
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
}

impl QfError {
    /// Caller-contract violations, reported immediately instead of degrading to "no data".
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            QfError::UnsupportedFrequency(_)
                | QfError::InvalidDetailLevel(_)
                | QfError::EmptyFieldSet { .. }
                | QfError::InvalidParams(_)
        )
    }

    /// Network-level failures (connection, HTTP status, custom transport).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            QfError::Http(_) | QfError::Status { .. } | QfError::Transport(_)
        )
    }
}
