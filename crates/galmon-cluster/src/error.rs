/// Errors from connecting to and querying cluster nodes.
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    /// The node's password is empty or still an unedited placeholder.
    /// Connecting would only produce a confusing authentication error,
    /// so fail before dialing.
    #[error("node {host} has a placeholder password, check the config")]
    PlaceholderCredentials { host: String },

    /// The TCP/handshake phase exceeded the configured timeout.
    #[error("connect to {host} timed out after {timeout_secs}s")]
    ConnectTimeout { host: String, timeout_secs: u64 },

    /// `long_query_time` must be a positive number of seconds.
    #[error("invalid long_query_time: {0}")]
    InvalidQueryTime(f64),

    /// An underlying driver error from `sqlx`.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience type alias so callers can write `error::Result<T>`.
pub type Result<T> = std::result::Result<T, ClusterError>;
