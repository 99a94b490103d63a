use crate::export::parse_export;
use galmon_common::types::{BalancerServerState, NodeConfig};
use std::collections::HashMap;

/// Maps balancer server rows back to cluster hosts.
///
/// A node's logical server name defaults to `node<position>` with the
/// position taken from config order (1-based); `balancer_name`
/// overrides it. Lookup is by name, so row order in the export never
/// matters.
pub struct BalancerStateCorrelator {
    backend: String,
}

impl BalancerStateCorrelator {
    pub fn new(backend: &str) -> Self {
        Self {
            backend: backend.to_string(),
        }
    }

    /// Builds a host-keyed state map from a raw stats export.
    ///
    /// Rows for servers no node claims are logged and dropped. Nodes
    /// without a matching row are simply absent from the result.
    pub fn correlate(
        &self,
        export: &str,
        nodes: &[NodeConfig],
    ) -> HashMap<String, BalancerServerState> {
        let hosts_by_name = server_names(nodes);
        let mut states = HashMap::new();
        for row in parse_export(export, &self.backend) {
            match hosts_by_name.get(&row.server_name) {
                Some(host) => {
                    states.insert(
                        host.clone(),
                        BalancerServerState {
                            current_connections: row.current_connections,
                            status: row.status,
                            weight: row.weight,
                        },
                    );
                }
                None => {
                    tracing::debug!(
                        server = %row.server_name,
                        "Export row does not match any configured node"
                    );
                }
            }
        }
        states
    }
}

/// Logical server name to host, for every configured node.
fn server_names(nodes: &[NodeConfig]) -> HashMap<String, String> {
    nodes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let name = node
                .balancer_name
                .clone()
                .unwrap_or_else(|| format!("node{}", i + 1));
            (name, node.host.clone())
        })
        .collect()
}
