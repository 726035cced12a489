use thiserror::Error;

/// Outcome of a failed forward lookup.
///
/// `NotFound` is an expected absence and is never retried. Everything else
/// is considered transient.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("name does not exist")]
    NotFound,
    #[error("transient resolution failure: {0}")]
    Transient(String),
}

impl LookupError {
    pub fn is_transient(&self) -> bool {
        matches!(self, LookupError::Transient(_))
    }
}

/// Failure of a single network probe (HTTP request, archive query).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("probe timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Structurally invalid input, rejected before any work starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid domain '{0}'")]
    InvalidDomain(String),
    #[error("invalid port '{0}'")]
    InvalidPort(String),
    #[error("worker count must be at least 1")]
    NoWorkers,
    #[error("retry policy must allow at least one attempt")]
    NoAttempts,
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write results: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode results: {0}")]
    Encode(String),
}
