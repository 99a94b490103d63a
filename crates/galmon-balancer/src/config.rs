use serde::Deserialize;

/// Balancer endpoint settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BalancerConfig {
    /// Stats export URL including the `;csv` suffix, e.g.
    /// `http://lb1:8404/stats;csv`.
    pub stats_url: String,
    pub username: String,
    pub password: String,
    /// Backend whose server rows belong to the cluster.
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Shell-free command line used by `restart`, split on whitespace.
    #[serde(default = "default_restart_command")]
    pub restart_command: String,
}

impl BalancerConfig {
    /// The admin form URL: the stats URL without its `;csv` suffix.
    pub fn admin_url(&self) -> String {
        self.stats_url.replace(";csv", "")
    }
}

fn default_backend() -> String {
    "galera_cluster_backend".to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_restart_command() -> String {
    "systemctl restart haproxy".to_string()
}
