//! One-shot administrative statements against a single node.

use crate::error::{ClusterError, Result};
use crate::mysql::connect;
use galmon_common::types::NodeConfig;
use sqlx::{Connection, Executor};

/// Terminates one connection on `node` by its processlist id.
pub async fn kill_session(
    node: &NodeConfig,
    connection_id: u64,
    connect_timeout_secs: u64,
) -> Result<()> {
    let mut conn = connect(node, connect_timeout_secs).await?;
    let sql = format!("KILL {connection_id}");
    conn.execute(sql.as_str()).await?;
    conn.close().await?;
    tracing::info!(node = %node.host, connection_id, "Killed connection");
    Ok(())
}

/// Turns the slow query log on or off and sets `long_query_time`.
///
/// The threshold is applied on both enable and disable so the value in
/// the server always matches the last request.
pub async fn set_slow_query_log(
    node: &NodeConfig,
    enable: bool,
    long_query_time_secs: f64,
    connect_timeout_secs: u64,
) -> Result<()> {
    if !long_query_time_secs.is_finite() || long_query_time_secs <= 0.0 {
        return Err(ClusterError::InvalidQueryTime(long_query_time_secs));
    }

    let mut conn = connect(node, connect_timeout_secs).await?;
    for statement in slow_log_statements(enable, long_query_time_secs) {
        conn.execute(statement.as_str()).await?;
    }
    conn.close().await?;
    tracing::info!(
        node = %node.host,
        enabled = enable,
        long_query_time = long_query_time_secs,
        "Updated slow query log settings"
    );
    Ok(())
}

pub(crate) fn slow_log_statements(enable: bool, long_query_time_secs: f64) -> Vec<String> {
    let toggle = if enable { "ON" } else { "OFF" };
    vec![
        format!("SET GLOBAL slow_query_log = '{toggle}'"),
        format!("SET GLOBAL long_query_time = {long_query_time_secs}"),
    ]
}
