use crate::error::{ClusterError, Result};
use crate::NodeReader;
use async_trait::async_trait;
use galmon_common::types::{is_placeholder_credential, NodeConfig};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection, Executor, Row};
use std::collections::HashMap;
use std::time::Duration;

/// Opens a connection to `node`, enforcing the placeholder check and
/// the connect timeout.
pub(crate) async fn connect(node: &NodeConfig, timeout_secs: u64) -> Result<MySqlConnection> {
    if is_placeholder_credential(&node.password) {
        return Err(ClusterError::PlaceholderCredentials {
            host: node.host.clone(),
        });
    }

    let options = MySqlConnectOptions::new()
        .host(&node.host)
        .port(node.port)
        .username(&node.user)
        .password(&node.password);

    match tokio::time::timeout(Duration::from_secs(timeout_secs), options.connect()).await {
        Ok(conn) => Ok(conn?),
        Err(_) => Err(ClusterError::ConnectTimeout {
            host: node.host.clone(),
            timeout_secs,
        }),
    }
}

/// `NodeReader` backed by a real MySQL connection per read.
pub struct MysqlNodeReader {
    connect_timeout_secs: u64,
}

impl MysqlNodeReader {
    pub fn new(connect_timeout_secs: u64) -> Self {
        Self {
            connect_timeout_secs,
        }
    }
}

#[async_trait]
impl NodeReader for MysqlNodeReader {
    async fn read(&self, node: &NodeConfig) -> Result<HashMap<String, String>> {
        let mut conn = connect(node, self.connect_timeout_secs).await?;

        let rows = conn.fetch_all("SHOW GLOBAL STATUS").await?;
        let mut status = HashMap::with_capacity(rows.len());
        for row in rows {
            let name: String = row.try_get(0)?;
            let value: String = row.try_get(1)?;
            status.insert(name, value);
        }

        conn.close().await?;
        tracing::debug!(node = %node.host, variables = status.len(), "Read node status");
        Ok(status)
    }
}
