use galmon_balancer::BalancerConfig;
use galmon_common::types::NodeConfig;
use galmon_engine::config::AlertConfig;
use galmon_notify::TelegramConfig;
use serde::Deserialize;

/// Whole-monitor configuration, loaded from one TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub cluster: ClusterConfig,
    pub balancer: BalancerConfig,
    #[serde(default)]
    pub alerts: AlertConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClusterConfig {
    /// Node order defines the default balancer server names
    /// (`node1`, `node2`, ...).
    pub nodes: Vec<NodeConfig>,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_max_concurrent_reads")]
    pub max_concurrent_reads: usize,
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_poll_interval() -> u64 {
    10
}

fn default_max_concurrent_reads() -> usize {
    8
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            max_concurrent_reads: default_max_concurrent_reads(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn find_node(&self, host: &str) -> Option<&NodeConfig> {
        self.cluster.nodes.iter().find(|node| node.host == host)
    }
}
