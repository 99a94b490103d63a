use crate::config::AlertConfig;
use crate::cooldown::CooldownTracker;
use crate::engine::AlertRuleEngine;
use crate::rate::RateTracker;
use crate::snapshot::SnapshotBuilder;
use chrono::{DateTime, Duration, TimeZone, Utc};
use galmon_common::types::{
    AlertKind, BalancerServerState, GaleraStatus, NodeRates, NodeSnapshot, Severity,
};
use std::collections::HashMap;

fn t(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(secs)
}

fn healthy_galera() -> GaleraStatus {
    GaleraStatus {
        cluster_size: 3,
        local_state_comment: "Synced".to_string(),
        cluster_status: "Primary".to_string(),
        ready: "ON".to_string(),
        flow_control_active: "false".to_string(),
        flow_control_recv: 0,
        flow_control_sent: 0,
        flow_control_paused: Some(0.0),
        local_cert_failures: 0,
        local_recv_queue: 0,
        local_send_queue: 0,
        writes: 0,
        reads: 0,
        queries: 0,
    }
}

fn snap(host: &str, galera: Result<GaleraStatus, String>) -> NodeSnapshot {
    NodeSnapshot {
        host: host.to_string(),
        galera,
        rates: NodeRates::default(),
        balancer: None,
        sampled_at: t(0),
    }
}

fn balancer_state(connections: i64, status: &str) -> BalancerServerState {
    BalancerServerState {
        current_connections: connections,
        status: status.to_string(),
        weight: 100,
    }
}

fn raw_status(writes: i64, reads: i64, queries: i64) -> HashMap<String, String> {
    let mut status = HashMap::new();
    status.insert("wsrep_local_state_comment".to_string(), "Synced".to_string());
    status.insert("wsrep_cluster_status".to_string(), "Primary".to_string());
    status.insert("wsrep_ready".to_string(), "ON".to_string());
    status.insert("wsrep_cluster_size".to_string(), "3".to_string());
    status.insert("Com_insert".to_string(), writes.to_string());
    status.insert("Com_select".to_string(), reads.to_string());
    status.insert("Queries".to_string(), queries.to_string());
    status
}

// RateTracker

#[test]
fn first_observation_returns_zero_and_sets_baseline() {
    let tracker = RateTracker::new();

    let first = tracker.compute_rates("db1", t(0), 100, 50, 200);
    assert_eq!(first, NodeRates::default());

    let second = tracker.compute_rates("db1", t(10), 150, 50, 300);
    assert_eq!(second.writes_per_second, 5.0);
    assert_eq!(second.reads_per_second, 0.0);
    assert_eq!(second.queries_per_second, 10.0);
}

#[test]
fn non_positive_time_delta_yields_zero_but_advances_state() {
    let tracker = RateTracker::new();
    tracker.compute_rates("db1", t(0), 100, 100, 100);

    // same timestamp again: no rate, but the sample becomes the baseline
    let dup = tracker.compute_rates("db1", t(0), 500, 500, 500);
    assert_eq!(dup, NodeRates::default());

    let later = tracker.compute_rates("db1", t(10), 600, 500, 700);
    assert_eq!(later.writes_per_second, 10.0);
    assert_eq!(later.reads_per_second, 0.0);
    assert_eq!(later.queries_per_second, 20.0);
}

#[test]
fn counter_reset_surfaces_negative_rate() {
    let tracker = RateTracker::new();
    tracker.compute_rates("db1", t(0), 1000, 1000, 1000);

    let rates = tracker.compute_rates("db1", t(10), 0, 1000, 1000);
    assert_eq!(rates.writes_per_second, -100.0);
    assert_eq!(rates.reads_per_second, 0.0);
}

#[test]
fn rates_round_to_two_decimals() {
    let tracker = RateTracker::new();
    tracker.compute_rates("db1", t(0), 0, 0, 0);

    let rates = tracker.compute_rates("db1", t(3), 1, 2, 100);
    assert_eq!(rates.writes_per_second, 0.33);
    assert_eq!(rates.reads_per_second, 0.67);
    assert_eq!(rates.queries_per_second, 33.33);
}

#[test]
fn hosts_track_independently() {
    let tracker = RateTracker::new();
    tracker.compute_rates("db1", t(0), 100, 0, 0);

    // first sight of db2 is a baseline even though db1 already has one
    let other = tracker.compute_rates("db2", t(10), 9999, 0, 0);
    assert_eq!(other, NodeRates::default());

    let db1 = tracker.compute_rates("db1", t(10), 200, 0, 0);
    assert_eq!(db1.writes_per_second, 10.0);
}

// SnapshotBuilder

#[test]
fn failed_read_populates_error_and_keeps_balancer_state() {
    let builder = SnapshotBuilder::new();
    let mut states = HashMap::new();
    states.insert("db1".to_string(), balancer_state(7, "UP"));

    let snapshot = builder.build("db1", Err("connection refused".to_string()), &states, t(0));
    assert_eq!(snapshot.galera, Err("connection refused".to_string()));
    assert_eq!(snapshot.rates, NodeRates::default());
    assert_eq!(snapshot.balancer, Some(balancer_state(7, "UP")));
    assert!(!snapshot.is_healthy_read());
}

#[test]
fn maint_state_forces_zero_rates() {
    let builder = SnapshotBuilder::new();
    let empty = HashMap::new();
    builder.build("db1", Ok(raw_status(100, 100, 100)), &empty, t(0));

    let mut maint = HashMap::new();
    maint.insert("db1".to_string(), balancer_state(0, "MAINT"));
    let snapshot = builder.build("db1", Ok(raw_status(600, 600, 600)), &maint, t(10));
    assert_eq!(snapshot.rates, NodeRates::default());

    // the tracker still advanced under MAINT, so the next in-service
    // cycle computes against the MAINT-cycle sample
    let mut up = HashMap::new();
    up.insert("db1".to_string(), balancer_state(3, "UP"));
    let snapshot = builder.build("db1", Ok(raw_status(700, 600, 800)), &up, t(20));
    assert_eq!(snapshot.rates.writes_per_second, 10.0);
    assert_eq!(snapshot.rates.queries_per_second, 20.0);
}

#[test]
fn drain_state_keeps_computed_rates() {
    let builder = SnapshotBuilder::new();
    let mut drain = HashMap::new();
    drain.insert("db1".to_string(), balancer_state(2, "DRAIN"));

    builder.build("db1", Ok(raw_status(0, 0, 0)), &drain, t(0));
    let snapshot = builder.build("db1", Ok(raw_status(100, 0, 100)), &drain, t(10));
    assert_eq!(snapshot.rates.writes_per_second, 10.0);
}

#[test]
fn failed_read_leaves_rate_baseline_untouched() {
    let builder = SnapshotBuilder::new();
    let empty = HashMap::new();

    builder.build("db1", Ok(raw_status(0, 0, 0)), &empty, t(0));
    builder.build("db1", Err("timeout".to_string()), &empty, t(10));

    // baseline is still the t=0 sample, so the delta spans 20 seconds
    let snapshot = builder.build("db1", Ok(raw_status(100, 0, 100)), &empty, t(20));
    assert_eq!(snapshot.rates.writes_per_second, 5.0);
    assert_eq!(snapshot.rates.queries_per_second, 5.0);
}

// AlertRuleEngine

#[test]
fn offline_fires_on_read_error_with_reason() {
    let engine = AlertRuleEngine::new(AlertConfig::default());
    let snapshots = vec![snap("db1", Err("connection refused".to_string()))];

    let events = engine.evaluate(&snapshots, t(0));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, AlertKind::NodeOffline);
    assert_eq!(events[0].severity, Severity::Critical);
    assert_eq!(events[0].host, "db1");
    assert_eq!(events[0].reason, "error: connection refused");
}

#[test]
fn offline_fires_when_not_synced() {
    let engine = AlertRuleEngine::new(AlertConfig::default());
    let mut galera = healthy_galera();
    galera.local_state_comment = "Donor/Desynced".to_string();
    let snapshots = vec![snap("db1", Ok(galera))];

    let events = engine.evaluate(&snapshots, t(0));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, AlertKind::NodeOffline);
    assert!(events[0].reason.contains("state=Donor/Desynced"));
}

#[test]
fn offline_fires_when_cluster_non_primary() {
    let engine = AlertRuleEngine::new(AlertConfig::default());
    let mut galera = healthy_galera();
    galera.cluster_status = "non-Primary".to_string();
    let snapshots = vec![snap("db1", Ok(galera))];

    let events = engine.evaluate(&snapshots, t(0));
    assert_eq!(events.len(), 1);
    assert!(events[0].reason.contains("cluster=non-Primary"));
}

#[test]
fn offline_accepts_ready_flag_variants() {
    let engine = AlertRuleEngine::new(AlertConfig::default());
    for ready in ["ON", "Ready", "1"] {
        let mut galera = healthy_galera();
        galera.ready = ready.to_string();
        let events = engine.evaluate(&[snap("db1", Ok(galera))], t(0));
        assert!(events.is_empty(), "ready={ready} should be healthy");
    }

    let mut galera = healthy_galera();
    galera.ready = "OFF".to_string();
    let events = engine.evaluate(&[snap("db2", Ok(galera))], t(0));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, AlertKind::NodeOffline);
}

#[test]
fn offline_rule_can_be_disabled() {
    let mut config = AlertConfig::default();
    config.node.offline = false;
    let engine = AlertRuleEngine::new(config);

    let events = engine.evaluate(&[snap("db1", Err("down".to_string()))], t(0));
    assert!(events.is_empty());
}

#[test]
fn flow_control_active_matches_true_case_insensitively() {
    let engine = AlertRuleEngine::new(AlertConfig::default());

    let mut galera = healthy_galera();
    galera.flow_control_active = "TRUE".to_string();
    let events = engine.evaluate(&[snap("db1", Ok(galera))], t(0));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, AlertKind::FlowControlActive);
    assert_eq!(events[0].severity, Severity::Warning);

    let mut galera = healthy_galera();
    galera.flow_control_active = "OFF".to_string();
    assert!(engine.evaluate(&[snap("db2", Ok(galera))], t(0)).is_empty());
}

#[test]
fn flow_control_paused_requires_configured_threshold() {
    // threshold unset: rule never runs
    let engine = AlertRuleEngine::new(AlertConfig::default());
    let mut galera = healthy_galera();
    galera.flow_control_paused = Some(0.9);
    assert!(engine.evaluate(&[snap("db1", Ok(galera))], t(0)).is_empty());

    let mut config = AlertConfig::default();
    config.flow_control.paused_threshold = Some(0.5);
    let engine = AlertRuleEngine::new(config);

    let mut galera = healthy_galera();
    galera.flow_control_paused = Some(0.9);
    let events = engine.evaluate(&[snap("db1", Ok(galera))], t(0));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, AlertKind::FlowControlPaused);
    assert!(events[0].reason.contains("0.9"));

    // unparseable metric: rule skipped for the cycle, no panic
    let mut galera = healthy_galera();
    galera.flow_control_paused = None;
    assert!(engine.evaluate(&[snap("db2", Ok(galera))], t(0)).is_empty());
}

#[test]
fn qps_bounds_are_strict_comparisons() {
    let mut config = AlertConfig::default();
    config.qps.min = Some(5.0);
    config.qps.max = Some(100.0);
    let engine = AlertRuleEngine::new(config);

    let mut at_min = snap("db1", Ok(healthy_galera()));
    at_min.rates.queries_per_second = 5.0;
    assert!(engine.evaluate(&[at_min], t(0)).is_empty());

    let mut below = snap("db2", Ok(healthy_galera()));
    below.rates.queries_per_second = 4.9;
    let events = engine.evaluate(&[below], t(0));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, AlertKind::QpsLow);
    assert_eq!(events[0].reason, "QPS low: 4.9 < 5");

    let mut at_max = snap("db3", Ok(healthy_galera()));
    at_max.rates.queries_per_second = 100.0;
    assert!(engine.evaluate(&[at_max], t(0)).is_empty());

    let mut above = snap("db4", Ok(healthy_galera()));
    above.rates.queries_per_second = 100.5;
    let events = engine.evaluate(&[above], t(0));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, AlertKind::QpsHigh);
}

#[test]
fn wps_low_fires_below_min() {
    let mut config = AlertConfig::default();
    config.wps.min = Some(1.0);
    let engine = AlertRuleEngine::new(config);

    let snapshot = snap("db1", Ok(healthy_galera()));
    let events = engine.evaluate(&[snapshot], t(0));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, AlertKind::WpsLow);
    assert_eq!(events[0].reason, "WPS low: 0 < 1");
}

#[test]
fn balancer_connections_rule_needs_state_and_threshold() {
    let mut config = AlertConfig::default();
    config.balancer.connections_critical = Some(100);
    let engine = AlertRuleEngine::new(config);

    // no balancer row for the node: unknown, not critical
    assert!(engine
        .evaluate(&[snap("db1", Ok(healthy_galera()))], t(0))
        .is_empty());

    let mut at_threshold = snap("db2", Ok(healthy_galera()));
    at_threshold.balancer = Some(balancer_state(100, "UP"));
    let events = engine.evaluate(&[at_threshold], t(0));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, AlertKind::BalancerConnectionsCritical);
    assert_eq!(events[0].severity, Severity::Critical);
    assert_eq!(events[0].reason, "current connections 100 >= 100");

    let mut below = snap("db3", Ok(healthy_galera()));
    below.balancer = Some(balancer_state(99, "UP"));
    assert!(engine.evaluate(&[below], t(0)).is_empty());
}

#[test]
fn disabled_engine_emits_nothing() {
    let mut config = AlertConfig::default();
    config.enabled = false;
    let engine = AlertRuleEngine::new(config);

    let events = engine.evaluate(&[snap("db1", Err("down".to_string()))], t(0));
    assert!(events.is_empty());
}

#[test]
fn cooldown_suppresses_within_window_and_releases_at_boundary() {
    let engine = AlertRuleEngine::new(AlertConfig::default());
    let snapshots = vec![snap("db1", Err("down".to_string()))];

    assert_eq!(engine.evaluate(&snapshots, t(0)).len(), 1);
    assert!(engine.evaluate(&snapshots, t(299)).is_empty());
    assert_eq!(engine.evaluate(&snapshots, t(300)).len(), 1);
}

#[test]
fn cooldown_state_is_per_node_and_per_rule() {
    let mut config = AlertConfig::default();
    config.qps.min = Some(5.0);
    let engine = AlertRuleEngine::new(config);

    // an errored node trips both offline and qps_low (rates are zero)
    let snapshots = vec![
        snap("db1", Err("down".to_string())),
        snap("db2", Err("down".to_string())),
    ];
    let events = engine.evaluate(&snapshots, t(0));
    let kinds: Vec<(String, AlertKind)> = events
        .iter()
        .map(|e| (e.host.clone(), e.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("db1".to_string(), AlertKind::NodeOffline),
            ("db1".to_string(), AlertKind::QpsLow),
            ("db2".to_string(), AlertKind::NodeOffline),
            ("db2".to_string(), AlertKind::QpsLow),
        ]
    );

    // everything suppressed inside the window, for both nodes
    assert!(engine.evaluate(&snapshots, t(10)).is_empty());
}

#[test]
fn rules_evaluate_in_fixed_order() {
    let mut config = AlertConfig::default();
    config.qps.min = Some(5.0);
    config.balancer.connections_critical = Some(10);
    let engine = AlertRuleEngine::new(config);

    let mut galera = healthy_galera();
    galera.local_state_comment = "Joined".to_string();
    galera.flow_control_active = "true".to_string();
    let mut snapshot = snap("db1", Ok(galera));
    snapshot.balancer = Some(balancer_state(50, "UP"));

    let events = engine.evaluate(&[snapshot], t(0));
    let kinds: Vec<AlertKind> = events.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            AlertKind::NodeOffline,
            AlertKind::FlowControlActive,
            AlertKind::QpsLow,
            AlertKind::BalancerConnectionsCritical,
        ]
    );
}

// CooldownTracker

#[test]
fn cooldown_tracker_records_on_fire_only() {
    let tracker = CooldownTracker::new();

    assert!(tracker.try_fire("db1", AlertKind::NodeOffline, t(0), 300));
    assert!(!tracker.try_fire("db1", AlertKind::NodeOffline, t(299), 300));
    assert!(tracker.try_fire("db1", AlertKind::NodeOffline, t(300), 300));

    // the suppressed attempt at t=299 must not have advanced the clock
    assert!(!tracker.try_fire("db1", AlertKind::NodeOffline, t(599), 300));
    assert!(tracker.try_fire("db1", AlertKind::NodeOffline, t(600), 300));
}

#[test]
fn cooldown_zero_never_suppresses() {
    let tracker = CooldownTracker::new();
    assert!(tracker.try_fire("db1", AlertKind::QpsLow, t(0), 0));
    assert!(tracker.try_fire("db1", AlertKind::QpsLow, t(0), 0));
}

// AlertConfig

#[test]
fn alert_config_defaults_from_empty_document() {
    let config: AlertConfig = toml::from_str("").unwrap();
    assert!(config.enabled);
    assert_eq!(config.cooldown_seconds, 300);
    assert!(config.node.offline);
    assert!(config.flow_control.active);
    assert_eq!(config.flow_control.paused_threshold, None);
    assert_eq!(config.qps.min, None);
    assert_eq!(config.balancer.connections_critical, None);
}

#[test]
fn alert_config_parses_full_document() {
    let text = r#"
        enabled = true
        cooldown_seconds = 120

        [qps]
        min = 10.0
        max = 5000.0

        [wps]
        max = 800.0

        [flow_control]
        active = false
        paused_threshold = 0.25

        [balancer]
        connections_critical = 900

        [node]
        offline = false
    "#;
    let config: AlertConfig = toml::from_str(text).unwrap();
    assert_eq!(config.cooldown_seconds, 120);
    assert_eq!(config.qps.min, Some(10.0));
    assert_eq!(config.qps.max, Some(5000.0));
    assert_eq!(config.wps.min, None);
    assert_eq!(config.wps.max, Some(800.0));
    assert!(!config.flow_control.active);
    assert_eq!(config.flow_control.paused_threshold, Some(0.25));
    assert_eq!(config.balancer.connections_critical, Some(900));
    assert!(!config.node.offline);
}
