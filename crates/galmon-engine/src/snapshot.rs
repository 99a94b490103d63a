use chrono::{DateTime, Utc};
use galmon_common::types::{BalancerServerState, GaleraStatus, NodeRates, NodeSnapshot};
use std::collections::HashMap;

use crate::rate::RateTracker;

/// Combines one node's raw status read, derived rates, and correlated
/// balancer state into a [`NodeSnapshot`].
///
/// The builder performs no I/O; it owns the [`RateTracker`] so that a
/// failed read leaves the node's rate baseline untouched and the next
/// successful read still has a valid, if stale, prior sample.
pub struct SnapshotBuilder {
    rates: RateTracker,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self {
            rates: RateTracker::new(),
        }
    }

    pub fn build(
        &self,
        host: &str,
        raw: Result<HashMap<String, String>, String>,
        balancer_states: &HashMap<String, BalancerServerState>,
        now: DateTime<Utc>,
    ) -> NodeSnapshot {
        // balancer visibility is independent of database reachability
        let balancer = balancer_states.get(host).cloned();

        match raw {
            Ok(status) => {
                let galera = GaleraStatus::from_status(&status);
                let mut rates = self.rates.compute_rates(
                    host,
                    now,
                    galera.writes,
                    galera.reads,
                    galera.queries,
                );
                // zero rates while the balancer has the server out of rotation
                if balancer.as_ref().is_some_and(|b| b.is_out_of_service()) {
                    rates = NodeRates::default();
                }
                NodeSnapshot {
                    host: host.to_string(),
                    galera: Ok(galera),
                    rates,
                    balancer,
                    sampled_at: now,
                }
            }
            Err(error) => NodeSnapshot {
                host: host.to_string(),
                galera: Err(error),
                rates: NodeRates::default(),
                balancer,
                sampled_at: now,
            },
        }
    }
}
