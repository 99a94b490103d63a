mod admin;
mod config;
mod cycle;


use anyhow::Result;
use galmon_balancer::{BalancerClient, BalancerStateCorrelator};
use galmon_cluster::MysqlNodeReader;
use galmon_engine::engine::AlertRuleEngine;
use galmon_engine::snapshot::SnapshotBuilder;
use galmon_notify::{Dispatcher, NotificationChannel, TelegramChannel};
use std::sync::Arc;
use tokio::signal;
use tokio::time::{interval, Duration};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::cycle::CycleRunner;

#[allow(clippy::print_stderr)]
fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  galmon-monitor [config.toml]                                  Start the monitor loop");
    eprintln!("  galmon-monitor enable <config.toml> <server>                  Put a balancer server into rotation");
    eprintln!("  galmon-monitor disable <config.toml> <server>                 Take a balancer server out of rotation");
    eprintln!("  galmon-monitor weight <config.toml> <server> <0-256>          Set a balancer server weight");
    eprintln!("  galmon-monitor restart-balancer <config.toml>                 Run the configured restart command");
    eprintln!("  galmon-monitor kill <config.toml> <host> <connection-id>      Kill one connection on a node");
    eprintln!("  galmon-monitor slow-log <config.toml> <host> <on|off> [secs]  Toggle the slow query log on a node");
}

fn require<'a>(args: &'a [String], index: usize, message: &str) -> Result<&'a str> {
    match args.get(index) {
        Some(value) => Ok(value.as_str()),
        None => {
            print_usage();
            Err(anyhow::anyhow!("{message}"))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("galmon=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("enable") => {
            let config_path = require(&args, 2, "enable requires <config.toml> and <server>")?;
            let server = require(&args, 3, "enable requires <server>")?;
            admin::enable_server(config_path, server).await
        }
        Some("disable") => {
            let config_path = require(&args, 2, "disable requires <config.toml> and <server>")?;
            let server = require(&args, 3, "disable requires <server>")?;
            admin::disable_server(config_path, server).await
        }
        Some("weight") => {
            let config_path =
                require(&args, 2, "weight requires <config.toml>, <server> and <0-256>")?;
            let server = require(&args, 3, "weight requires <server> and <0-256>")?;
            let raw = require(&args, 4, "weight requires <0-256>")?;
            let weight: i64 = raw
                .parse()
                .map_err(|_| anyhow::anyhow!("weight must be an integer, got '{raw}'"))?;
            admin::set_weight(config_path, server, weight).await
        }
        Some("restart-balancer") => {
            let config_path = require(&args, 2, "restart-balancer requires <config.toml>")?;
            admin::restart_balancer(config_path).await
        }
        Some("kill") => {
            let config_path =
                require(&args, 2, "kill requires <config.toml>, <host> and <connection-id>")?;
            let host = require(&args, 3, "kill requires <host> and <connection-id>")?;
            let raw = require(&args, 4, "kill requires <connection-id>")?;
            let connection_id: u64 = raw
                .parse()
                .map_err(|_| anyhow::anyhow!("connection id must be an integer, got '{raw}'"))?;
            admin::kill_connection(config_path, host, connection_id).await
        }
        Some("slow-log") => {
            let config_path =
                require(&args, 2, "slow-log requires <config.toml>, <host> and <on|off>")?;
            let host = require(&args, 3, "slow-log requires <host> and <on|off>")?;
            let enable = match require(&args, 4, "slow-log requires <on|off>")? {
                "on" => true,
                "off" => false,
                other => {
                    print_usage();
                    return Err(anyhow::anyhow!("slow-log expects on or off, got '{other}'"));
                }
            };
            let long_query_time_secs: f64 = match args.get(5) {
                Some(raw) => raw.parse().map_err(|_| {
                    anyhow::anyhow!("long query time must be a number of seconds, got '{raw}'")
                })?,
                None => 1.0,
            };
            admin::set_slow_log(config_path, host, enable, long_query_time_secs).await
        }
        Some("--help" | "-h") => {
            print_usage();
            Ok(())
        }
        _ => {
            let config_path = args
                .get(1)
                .map(|s| s.as_str())
                .unwrap_or("config/galmon.toml");
            run_monitor(config_path).await
        }
    }
}

/// Poll loop: one cycle per tick until Ctrl-C.
async fn run_monitor(config_path: &str) -> Result<()> {
    let config = Config::load(config_path)?;
    let runner = build_runner(&config);

    tracing::info!(
        nodes = config.cluster.nodes.len(),
        interval_secs = config.monitor.poll_interval_secs,
        backend = %config.balancer.backend,
        "galmon-monitor starting"
    );

    let mut tick = interval(Duration::from_secs(config.monitor.poll_interval_secs));
    loop {
        tokio::select! {
            _ = tick.tick() => {
                match runner.run_cycle().await {
                    Ok(outcome) => {
                        tracing::debug!(
                            snapshots = outcome.snapshots.len(),
                            events = outcome.events.len(),
                            "Cycle complete"
                        );
                    }
                    Err(e) => tracing::warn!(error = %e, "Cycle failed"),
                }
            }
            _ = signal::ctrl_c() => {
                tracing::info!("Shutting down gracefully");
                break;
            }
        }
    }

    Ok(())
}

fn build_runner(config: &Config) -> CycleRunner {
    let reader = Arc::new(MysqlNodeReader::new(config.cluster.connect_timeout_secs));
    let fetcher = Arc::new(BalancerClient::new(config.balancer.clone()));
    let correlator = BalancerStateCorrelator::new(&config.balancer.backend);

    let mut channels: Vec<Box<dyn NotificationChannel>> = Vec::new();
    if let Some(telegram) = TelegramChannel::from_config(&config.telegram) {
        channels.push(Box::new(telegram));
    }
    if channels.is_empty() {
        tracing::warn!("No notification channels active, alerts will only be logged");
    }

    CycleRunner::new(
        config.cluster.nodes.clone(),
        reader,
        fetcher,
        correlator,
        SnapshotBuilder::new(),
        AlertRuleEngine::new(config.alerts.clone()),
        Dispatcher::new(channels),
        config.monitor.max_concurrent_reads,
    )
}
