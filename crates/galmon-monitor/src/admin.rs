//! One-shot admin subcommands. Each loads the config, performs its
//! action and prints the outcome.

use crate::config::Config;
use anyhow::Result;
use galmon_balancer::BalancerClient;

#[allow(clippy::print_stdout)]
pub async fn enable_server(config_path: &str, server: &str) -> Result<()> {
    let config = Config::load(config_path)?;
    BalancerClient::new(config.balancer)
        .enable_server(server)
        .await?;
    println!("Server {server} enabled");
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn disable_server(config_path: &str, server: &str) -> Result<()> {
    let config = Config::load(config_path)?;
    BalancerClient::new(config.balancer)
        .disable_server(server)
        .await?;
    println!("Server {server} disabled");
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn set_weight(config_path: &str, server: &str, weight: i64) -> Result<()> {
    let config = Config::load(config_path)?;
    BalancerClient::new(config.balancer)
        .set_weight(server, weight)
        .await?;
    println!("Server {server} weight set to {weight}");
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn restart_balancer(config_path: &str) -> Result<()> {
    let config = Config::load(config_path)?;
    BalancerClient::new(config.balancer).restart().await?;
    println!("Balancer restarted");
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn kill_connection(config_path: &str, host: &str, connection_id: u64) -> Result<()> {
    let config = Config::load(config_path)?;
    let node = config
        .find_node(host)
        .ok_or_else(|| anyhow::anyhow!("host '{host}' is not in the config"))?;
    galmon_cluster::admin::kill_session(node, connection_id, config.cluster.connect_timeout_secs)
        .await?;
    println!("Killed connection {connection_id} on {host}");
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn set_slow_log(
    config_path: &str,
    host: &str,
    enable: bool,
    long_query_time_secs: f64,
) -> Result<()> {
    let config = Config::load(config_path)?;
    let node = config
        .find_node(host)
        .ok_or_else(|| anyhow::anyhow!("host '{host}' is not in the config"))?;
    galmon_cluster::admin::set_slow_query_log(
        node,
        enable,
        long_query_time_secs,
        config.cluster.connect_timeout_secs,
    )
    .await?;
    let state = if enable { "enabled" } else { "disabled" };
    println!("Slow query log {state} on {host} (long_query_time = {long_query_time_secs}s)");
    Ok(())
}
