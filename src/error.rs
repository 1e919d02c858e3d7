use thiserror::Error;

/// Reasons the broker cannot dispatch a request.
///
/// These never reach callers: the broker turns them into a denial.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BrokerError {
    /// The bound session has been destroyed or closed.
    #[error("session is no longer live")]
    SessionGone,
    /// The session is live but has no primary execution frame.
    #[error("session has no main frame")]
    NoMainFrame,
}

/// Errors from loading or validating a [`BrokerConfig`](crate::BrokerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A decision timeout of zero would deny every request.
    #[error("decision timeout must be greater than zero")]
    ZeroTimeout,
    /// The configuration document could not be parsed.
    #[error("invalid broker configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
