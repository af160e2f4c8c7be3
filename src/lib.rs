//! # playbook-graph
//!
//! Editing core for a library of playbooks drawn as a directed graph.
//!
//! ## Architecture
//!
//! - [wire]: service records to [Playbook]/[Play] and back.
//! - [graph_builder]: one node per play, one edge per link declaration.
//! - [edge_set]: ordered edge set keyed by canonical edge id.
//! - [path_resolver]: first-discovery depth-first node path.
//! - [session]: node set, edge set and path of one editing session.
//! - [coordinator] and [log_poller]: remote execution and bounded log polling
//!   through a [PlaybookService].

pub mod config;
pub mod coordinator;
pub mod edge_set;
pub mod error;
pub mod graph_builder;
pub mod log_poller;
#[cfg(test)]
mod log_poller_test;
pub mod path_resolver;
#[cfg(test)]
mod path_resolver_test;
pub mod service;
pub mod session;
pub mod snapshot_io;
#[cfg(test)]
mod test_support;
pub mod types;
pub mod wire;

pub use config::Config;
pub use coordinator::{ConnectOutcome, ExecutionCoordinator};
pub use edge_set::{EdgeSet, deduplicate};
pub use error::ServiceError;
pub use graph_builder::{BuiltGraph, build_graph};
pub use log_poller::PollingWindow;
pub use path_resolver::{RootPolicy, resolve_node_path, resolve_segments};
pub use service::{HttpPlaybookService, PlaybookService};
pub use session::EditorSession;
pub use types::{EdgeId, GraphEdge, GraphNode, NodePath, Play, Playbook};
pub use wire::{deserialize_playbooks, fetch_all_playbooks, parse_playbooks, serialize_playbooks};
