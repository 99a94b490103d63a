//! Cluster node access over the MySQL protocol.
//!
//! Every operation opens a short-lived connection, runs its statements
//! and closes it; nothing is pooled between poll cycles.

use async_trait::async_trait;
use galmon_common::types::NodeConfig;
use std::collections::HashMap;

pub mod admin;
pub mod error;
pub mod mysql;


pub use error::{ClusterError, Result};
pub use mysql::MysqlNodeReader;

/// Reads the raw `SHOW GLOBAL STATUS` key/value map from one node.
#[async_trait]
pub trait NodeReader: Send + Sync {
    async fn read(&self, node: &NodeConfig) -> Result<HashMap<String, String>>;
}
