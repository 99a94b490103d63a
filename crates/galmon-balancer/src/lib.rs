//! Load balancer integration: fetching and parsing the stats export,
//! correlating backend servers to cluster nodes, and the admin actions
//! (enable, disable, set weight, restart).

use async_trait::async_trait;

pub mod client;
pub mod config;
pub mod correlate;
pub mod error;
pub mod export;


pub use client::BalancerClient;
pub use config::BalancerConfig;
pub use correlate::BalancerStateCorrelator;
pub use error::{BalancerError, Result};

/// Fetches the raw CSV stats export from the balancer.
#[async_trait]
pub trait ExportFetcher: Send + Sync {
    async fn fetch_export(&self) -> Result<String>;
}
