use chrono::{DateTime, Utc};
use galmon_common::types::{AlertEvent, AlertKind, NodeSnapshot};

use crate::config::AlertConfig;
use crate::cooldown::CooldownTracker;

/// Evaluates the fixed alert rule set against each node snapshot and
/// emits the events that pass cooldown suppression.
///
/// Rules are checked in a fixed order per node (offline, flow control,
/// throughput, balancer connections) but are independent: an earlier
/// firing never short-circuits a later rule, and each (node, kind)
/// pair has its own cooldown entry. No "resolved" event exists; a
/// condition that clears simply stops firing.
pub struct AlertRuleEngine {
    config: AlertConfig,
    cooldown: CooldownTracker,
}

impl AlertRuleEngine {
    pub fn new(config: AlertConfig) -> Self {
        Self {
            config,
            cooldown: CooldownTracker::new(),
        }
    }

    pub fn evaluate(&self, snapshots: &[NodeSnapshot], now: DateTime<Utc>) -> Vec<AlertEvent> {
        let mut events = Vec::new();
        if !self.config.enabled {
            return events;
        }
        for snapshot in snapshots {
            self.evaluate_node(snapshot, now, &mut events);
        }
        events
    }

    fn evaluate_node(&self, snapshot: &NodeSnapshot, now: DateTime<Utc>, events: &mut Vec<AlertEvent>) {
        if self.config.node.offline {
            if let Some(reason) = offline_reason(snapshot) {
                self.fire(snapshot, AlertKind::NodeOffline, reason, now, events);
            }
        }

        // flow control rules need an actual status read
        if let Ok(galera) = &snapshot.galera {
            if self.config.flow_control.active
                && galera.flow_control_active.to_lowercase() == "true"
            {
                self.fire(
                    snapshot,
                    AlertKind::FlowControlActive,
                    "flow control is active".to_string(),
                    now,
                    events,
                );
            }

            if let Some(threshold) = self.config.flow_control.paused_threshold {
                // a missing or malformed value skips the rule for the cycle
                if let Some(paused) = galera.flow_control_paused {
                    if paused >= threshold {
                        self.fire(
                            snapshot,
                            AlertKind::FlowControlPaused,
                            format!("flow_control_paused={paused} >= threshold={threshold}"),
                            now,
                            events,
                        );
                    }
                }
            }
        }

        let qps = snapshot.rates.queries_per_second;
        if let Some(min) = self.config.qps.min {
            if qps < min {
                self.fire(
                    snapshot,
                    AlertKind::QpsLow,
                    format!("QPS low: {qps} < {min}"),
                    now,
                    events,
                );
            }
        }
        if let Some(max) = self.config.qps.max {
            if qps > max {
                self.fire(
                    snapshot,
                    AlertKind::QpsHigh,
                    format!("QPS high: {qps} > {max}"),
                    now,
                    events,
                );
            }
        }

        let wps = snapshot.rates.writes_per_second;
        if let Some(min) = self.config.wps.min {
            if wps < min {
                self.fire(
                    snapshot,
                    AlertKind::WpsLow,
                    format!("WPS low: {wps} < {min}"),
                    now,
                    events,
                );
            }
        }
        if let Some(max) = self.config.wps.max {
            if wps > max {
                self.fire(
                    snapshot,
                    AlertKind::WpsHigh,
                    format!("WPS high: {wps} > {max}"),
                    now,
                    events,
                );
            }
        }

        if let (Some(threshold), Some(balancer)) = (
            self.config.balancer.connections_critical,
            snapshot.balancer.as_ref(),
        ) {
            if balancer.current_connections >= threshold {
                self.fire(
                    snapshot,
                    AlertKind::BalancerConnectionsCritical,
                    format!(
                        "current connections {} >= {threshold}",
                        balancer.current_connections
                    ),
                    now,
                    events,
                );
            }
        }
    }

    fn fire(
        &self,
        snapshot: &NodeSnapshot,
        kind: AlertKind,
        reason: String,
        now: DateTime<Utc>,
        events: &mut Vec<AlertEvent>,
    ) {
        if self
            .cooldown
            .try_fire(&snapshot.host, kind, now, self.config.cooldown_seconds)
        {
            events.push(AlertEvent {
                host: snapshot.host.clone(),
                kind,
                severity: kind.severity(),
                reason,
                timestamp: now,
            });
        } else {
            tracing::debug!(
                host = %snapshot.host,
                kind = %kind,
                "Alert suppressed (cooldown)"
            );
        }
    }
}

/// Why a node counts as offline/unsynced, or `None` when it is healthy.
///
/// The reason carries all three wsrep labels so the failing one is
/// visible in the alert text.
fn offline_reason(snapshot: &NodeSnapshot) -> Option<String> {
    let galera = match &snapshot.galera {
        Ok(galera) => galera,
        Err(error) => return Some(format!("error: {error}")),
    };

    let synced = galera.local_state_comment.to_lowercase() == "synced";
    let primary = galera.cluster_status.to_lowercase() == "primary";
    let ready = matches!(galera.ready.to_lowercase().as_str(), "on" | "ready" | "1");

    if synced && primary && ready {
        None
    } else {
        Some(format!(
            "state={}, cluster={}, ready={}",
            galera.local_state_comment, galera.cluster_status, galera.ready
        ))
    }
}
