/// Errors from talking to the balancer's stats and admin endpoints.
#[derive(Debug, thiserror::Error)]
pub enum BalancerError {
    /// The stats password is empty or still an unedited placeholder.
    #[error("balancer stats password is a placeholder, check the config")]
    PlaceholderCredentials,

    /// The balancer answered with a status outside the accepted set.
    #[error("balancer returned unexpected status {status}")]
    UnexpectedStatus { status: u16 },

    /// Weight must be between 0 and 256 inclusive.
    #[error("weight {0} is out of range 0..=256")]
    WeightOutOfRange(i64),

    #[error("restart command is empty")]
    EmptyRestartCommand,

    /// The restart command ran but exited non-zero.
    #[error("restart command exited with status {status}: {stderr}")]
    RestartFailed { status: i32, stderr: String },

    /// An underlying HTTP transport error from `reqwest`.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Spawning or waiting on the restart command failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias so callers can write `error::Result<T>`.
pub type Result<T> = std::result::Result<T, BalancerError>;
