use chrono::{DateTime, Utc};
use galmon_common::types::NodeRates;
use std::collections::HashMap;
use std::sync::Mutex;

/// Last observed cumulative counters for one node.
#[derive(Debug, Clone, Copy)]
struct RateState {
    writes: i64,
    reads: i64,
    queries: i64,
    timestamp: DateTime<Utc>,
}

/// Derives per-second rates from monotonic counters, keeping exactly
/// one prior sample per node.
///
/// Entries are created on first observation and overwritten on every
/// later one; a node removed from the configuration leaves a dormant
/// entry behind, which is reused if the node returns.
pub struct RateTracker {
    state: Mutex<HashMap<String, RateState>>,
}

impl RateTracker {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HashMap::new()),
        }
    }

    /// Computes per-second write/read/query rates for `host` against
    /// the previously recorded sample, then records the current sample
    /// as the new baseline.
    ///
    /// The first observation for a host yields zero rates, as does any
    /// pair of samples with a non-positive time delta. A counter that
    /// went backwards (node restart) produces a negative rate rather
    /// than being clamped.
    pub fn compute_rates(
        &self,
        host: &str,
        now: DateTime<Utc>,
        writes: i64,
        reads: i64,
        queries: i64,
    ) -> NodeRates {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let rates = match state.get(host) {
            Some(prev) => {
                let dt = (now - prev.timestamp).num_milliseconds() as f64 / 1000.0;
                if dt > 0.0 {
                    NodeRates {
                        writes_per_second: round2((writes - prev.writes) as f64 / dt),
                        reads_per_second: round2((reads - prev.reads) as f64 / dt),
                        queries_per_second: round2((queries - prev.queries) as f64 / dt),
                    }
                } else {
                    NodeRates::default()
                }
            }
            None => NodeRates::default(),
        };

        state.insert(
            host.to_string(),
            RateState {
                writes,
                reads,
                queries,
                timestamp: now,
            },
        );

        rates
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
