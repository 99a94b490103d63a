//! Shared types for the galmon cluster monitor.
//!
//! Everything that crosses a crate boundary lives here: node
//! configuration, the per-cycle [`types::NodeSnapshot`], balancer server
//! state, and alert events.

pub mod types;
