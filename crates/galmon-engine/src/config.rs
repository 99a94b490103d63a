use serde::Deserialize;

/// Alert rule thresholds and the global alerting switches.
///
/// Every field has a default, so a config file without an `[alerts]`
/// section gets alerting enabled with a 300 second cooldown and only
/// the threshold-free rules (offline, flow control active) armed.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Minimum seconds between two firings of the same (node, rule)
    /// pair. One duration applies to every rule kind.
    #[serde(default = "default_cooldown_seconds")]
    pub cooldown_seconds: u64,
    #[serde(default)]
    pub qps: RateBounds,
    #[serde(default)]
    pub wps: RateBounds,
    #[serde(default)]
    pub flow_control: FlowControlAlerts,
    #[serde(default)]
    pub balancer: BalancerAlerts,
    #[serde(default)]
    pub node: NodeAlerts,
}

/// Lower/upper bounds for a derived per-second rate. Either bound may
/// be left unset; each is checked independently.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RateBounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FlowControlAlerts {
    #[serde(default = "default_enabled")]
    pub active: bool,
    /// The paused rule only runs when this is set.
    pub paused_threshold: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct BalancerAlerts {
    pub connections_critical: Option<i64>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct NodeAlerts {
    #[serde(default = "default_enabled")]
    pub offline: bool,
}

fn default_enabled() -> bool {
    true
}

fn default_cooldown_seconds() -> u64 {
    300
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            cooldown_seconds: default_cooldown_seconds(),
            qps: RateBounds::default(),
            wps: RateBounds::default(),
            flow_control: FlowControlAlerts::default(),
            balancer: BalancerAlerts::default(),
            node: NodeAlerts::default(),
        }
    }
}

impl Default for FlowControlAlerts {
    fn default() -> Self {
        Self {
            active: default_enabled(),
            paused_threshold: None,
        }
    }
}

impl Default for NodeAlerts {
    fn default() -> Self {
        Self {
            offline: default_enabled(),
        }
    }
}
