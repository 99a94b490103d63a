//! Metrics aggregation and alert evaluation core.
//!
//! Per poll cycle, the [`snapshot::SnapshotBuilder`] combines each
//! node's raw status read (or error) with per-second rates from the
//! [`rate::RateTracker`] and the correlated balancer state into a
//! [`galmon_common::types::NodeSnapshot`]. The
//! [`engine::AlertRuleEngine`] then evaluates the fixed rule set over
//! the snapshots, with per-(node, rule) cooldown suppression handled by
//! the [`cooldown::CooldownTracker`].
//!
//! The trackers are the only state carried across cycles. Both are
//! mutex-guarded maps keyed by node host, held only for the
//! read-modify-write, never across I/O.

pub mod config;
pub mod cooldown;
pub mod engine;
pub mod rate;
pub mod snapshot;

#[cfg(test)]
mod tests;
