use anyhow::Result;
use chrono::Utc;
use galmon_balancer::{BalancerStateCorrelator, ExportFetcher};
use galmon_cluster::NodeReader;
use galmon_common::types::{AlertEvent, BalancerServerState, NodeConfig, NodeSnapshot};
use galmon_engine::engine::AlertRuleEngine;
use galmon_engine::snapshot::SnapshotBuilder;
use galmon_notify::Dispatcher;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// A node's raw status map, or the error that prevented reading it.
type RawReading = std::result::Result<HashMap<String, String>, String>;

/// Everything one poll cycle produced.
pub struct CycleOutcome {
    pub snapshots: Vec<NodeSnapshot>,
    pub events: Vec<AlertEvent>,
    /// Delivery flag per event, aligned with `events`.
    pub delivered: Vec<bool>,
}

/// Runs the fetch, correlate, read, evaluate, dispatch sequence once
/// per call. Cross-cycle state lives inside the snapshot builder and
/// the rule engine.
pub struct CycleRunner {
    nodes: Vec<NodeConfig>,
    reader: Arc<dyn NodeReader>,
    fetcher: Arc<dyn ExportFetcher>,
    correlator: BalancerStateCorrelator,
    builder: SnapshotBuilder,
    engine: AlertRuleEngine,
    dispatcher: Dispatcher,
    read_slots: Arc<Semaphore>,
}

impl CycleRunner {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        nodes: Vec<NodeConfig>,
        reader: Arc<dyn NodeReader>,
        fetcher: Arc<dyn ExportFetcher>,
        correlator: BalancerStateCorrelator,
        builder: SnapshotBuilder,
        engine: AlertRuleEngine,
        dispatcher: Dispatcher,
        max_concurrent_reads: usize,
    ) -> Self {
        Self {
            nodes,
            reader,
            fetcher,
            correlator,
            builder,
            engine,
            dispatcher,
            read_slots: Arc::new(Semaphore::new(max_concurrent_reads)),
        }
    }

    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let balancer_states = self.balancer_states().await;
        let mut readings = self.read_all_nodes().await?;

        let now = Utc::now();
        let mut snapshots = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let raw = readings
                .remove(&node.host)
                .unwrap_or_else(|| Err("read task failed".to_string()));
            snapshots.push(self.builder.build(&node.host, raw, &balancer_states, now));
        }

        let events = self.engine.evaluate(&snapshots, now);
        let delivered = self.dispatcher.dispatch(&events).await;
        for (event, sent) in events.iter().zip(&delivered) {
            tracing::info!(
                host = %event.host,
                kind = %event.kind,
                severity = %event.severity,
                reason = %event.reason,
                delivered = sent,
                "Alert fired"
            );
        }

        Ok(CycleOutcome {
            snapshots,
            events,
            delivered,
        })
    }

    /// Balancer state per host, or an empty map when the export cannot
    /// be fetched. A missing export never blocks the node reads.
    async fn balancer_states(&self) -> HashMap<String, BalancerServerState> {
        match self.fetcher.fetch_export().await {
            Ok(export) => self.correlator.correlate(&export, &self.nodes),
            Err(error) => {
                tracing::warn!(error = %error, "Balancer export unavailable");
                HashMap::new()
            }
        }
    }

    /// Reads every node concurrently, bounded by `read_slots`. A
    /// failed read becomes that node's error string; a panicked task
    /// leaves its node out of the map.
    async fn read_all_nodes(&self) -> Result<HashMap<String, RawReading>> {
        let mut tasks = Vec::with_capacity(self.nodes.len());
        for node in self.nodes.clone() {
            let reader = Arc::clone(&self.reader);
            let permit = Arc::clone(&self.read_slots).acquire_owned().await?;
            tasks.push(tokio::spawn(async move {
                let _permit = permit;
                let result = reader.read(&node).await.map_err(|e| e.to_string());
                (node.host, result)
            }));
        }

        let mut readings = HashMap::with_capacity(tasks.len());
        for task in tasks {
            match task.await {
                Ok((host, result)) => {
                    if let Err(error) = &result {
                        tracing::warn!(node = %host, error = %error, "Node read failed");
                    }
                    readings.insert(host, result);
                }
                Err(error) => {
                    tracing::warn!(error = %error, "Node read task panicked");
                }
            }
        }
        Ok(readings)
    }
}
