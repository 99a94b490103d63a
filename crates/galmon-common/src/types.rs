use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Connection settings for one cluster node.
///
/// `host` doubles as the node's identity: it keys rate state, cooldown
/// state, and the correlated balancer view.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    pub host: String,
    #[serde(default = "default_mysql_port")]
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Logical server name in the balancer backend. Defaults to
    /// `node<position>` (1-based) when unset.
    #[serde(default)]
    pub balancer_name: Option<String>,
}

fn default_mysql_port() -> u16 {
    3306
}

/// Returns true when a password is empty or still one of the common
/// placeholder strings, meaning the entry has not been configured yet.
pub fn is_placeholder_credential(password: &str) -> bool {
    matches!(password, "" | "password" | "your_password")
}

/// Alert severity level, ordered from lowest to highest.
///
/// # Examples
///
/// ```
/// use galmon_common::types::Severity;
///
/// let sev: Severity = "warning".parse().unwrap();
/// assert_eq!(sev, Severity::Warning);
/// assert_eq!(sev.to_string(), "warning");
/// assert!(Severity::Critical > Severity::Info);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!("unknown severity: {s}")),
        }
    }
}

/// The fixed set of alert rules the engine evaluates.
///
/// Each kind keys its own cooldown state, so suppression of one rule
/// never blocks another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    NodeOffline,
    FlowControlActive,
    FlowControlPaused,
    QpsLow,
    QpsHigh,
    WpsLow,
    WpsHigh,
    BalancerConnectionsCritical,
}

impl AlertKind {
    pub fn severity(self) -> Severity {
        match self {
            AlertKind::NodeOffline | AlertKind::BalancerConnectionsCritical => Severity::Critical,
            _ => Severity::Warning,
        }
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AlertKind::NodeOffline => "node_offline",
            AlertKind::FlowControlActive => "flow_control_active",
            AlertKind::FlowControlPaused => "flow_control_paused",
            AlertKind::QpsLow => "qps_low",
            AlertKind::QpsHigh => "qps_high",
            AlertKind::WpsLow => "wps_low",
            AlertKind::WpsHigh => "wps_high",
            AlertKind::BalancerConnectionsCritical => "balancer_connections_critical",
        };
        write!(f, "{name}")
    }
}

/// One alert produced by the rule engine. Consumed by the dispatcher
/// and the caller's cycle log; not persisted anywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEvent {
    pub host: String,
    pub kind: AlertKind,
    pub severity: Severity,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

/// Derived per-second rates for one node, rounded to two decimals.
///
/// Negative values are possible after a counter reset (node restart)
/// and are passed through so the restart is visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeRates {
    pub writes_per_second: f64,
    pub reads_per_second: f64,
    pub queries_per_second: f64,
}

/// Balancer-reported state for one backend server, rebuilt from the
/// stats export on every poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalancerServerState {
    pub current_connections: i64,
    /// Raw administrative status string, e.g. `UP`, `DOWN 1/2`, `MAINT`.
    pub status: String,
    pub weight: i64,
}

impl BalancerServerState {
    /// True when the status marks the server as out of rotation
    /// (`MAINT*` or `DOWN*`). A draining server still carries traffic
    /// and does not count.
    pub fn is_out_of_service(&self) -> bool {
        let status = self.status.to_uppercase();
        status.starts_with("MAINT") || status.starts_with("DOWN")
    }
}

/// The wsrep/status fields the monitor consumes, extracted from a raw
/// `SHOW GLOBAL STATUS` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaleraStatus {
    pub cluster_size: i64,
    pub local_state_comment: String,
    pub cluster_status: String,
    pub ready: String,
    pub flow_control_active: String,
    pub flow_control_recv: i64,
    pub flow_control_sent: i64,
    /// Fraction of time spent paused by flow control. `None` when the
    /// variable is missing or not numeric, which skips the paused rule
    /// for the cycle.
    pub flow_control_paused: Option<f64>,
    pub local_cert_failures: i64,
    pub local_recv_queue: i64,
    pub local_send_queue: i64,
    /// Cumulative write statements: Com_insert + Com_insert_select +
    /// Com_update + Com_update_multi.
    pub writes: i64,
    /// Cumulative Com_select.
    pub reads: i64,
    /// Cumulative Queries counter.
    pub queries: i64,
}

impl GaleraStatus {
    /// Extracts the monitored fields from a raw status map. Missing or
    /// malformed numeric values default to 0.
    pub fn from_status(status: &HashMap<String, String>) -> Self {
        Self {
            cluster_size: int_field(status, "wsrep_cluster_size"),
            local_state_comment: str_field(status, "wsrep_local_state_comment"),
            cluster_status: str_field(status, "wsrep_cluster_status"),
            ready: str_field(status, "wsrep_ready"),
            flow_control_active: str_field(status, "wsrep_flow_control_active"),
            flow_control_recv: int_field(status, "wsrep_flow_control_recv"),
            flow_control_sent: int_field(status, "wsrep_flow_control_sent"),
            flow_control_paused: status
                .get("wsrep_flow_control_paused")
                .and_then(|v| v.trim().parse().ok()),
            local_cert_failures: int_field(status, "wsrep_local_cert_failures"),
            local_recv_queue: int_field(status, "wsrep_local_recv_queue"),
            local_send_queue: int_field(status, "wsrep_local_send_queue"),
            writes: int_field(status, "Com_insert")
                + int_field(status, "Com_insert_select")
                + int_field(status, "Com_update")
                + int_field(status, "Com_update_multi"),
            reads: int_field(status, "Com_select"),
            queries: int_field(status, "Queries"),
        }
    }
}

fn int_field(status: &HashMap<String, String>, key: &str) -> i64 {
    status
        .get(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

fn str_field(status: &HashMap<String, String>, key: &str) -> String {
    status.get(key).cloned().unwrap_or_default()
}

/// One node's combined view for a single poll cycle: extracted metrics
/// (or the read error), derived rates, and the correlated balancer
/// state. Built fresh every cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub host: String,
    /// Extracted status fields, or the node read error.
    pub galera: Result<GaleraStatus, String>,
    pub rates: NodeRates,
    /// `None` when the balancer export had no row for this node or was
    /// unavailable; balancer state is never carried over from a
    /// previous cycle.
    pub balancer: Option<BalancerServerState>,
    pub sampled_at: DateTime<Utc>,
}

impl NodeSnapshot {
    pub fn is_healthy_read(&self) -> bool {
        self.galera.is_ok()
    }
}
