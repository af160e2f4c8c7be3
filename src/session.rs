//! One editing session: the node set, the edge set and the resolved path.
//!
//! Every mutation is committed in full before the path is recomputed, and
//! the path is recomputed from scratch exactly once per mutation. A bulk load
//! merges every playbook before recomputing, so no intermediate path is ever
//! observable. Mutations that change nothing do not recompute.

use crate::edge_set::EdgeSet;
use crate::graph_builder::{build_graph, build_node};
use crate::path_resolver::{RootPolicy, resolve_node_path};
use crate::types::{EdgeId, EdgeOrigin, GraphEdge, GraphNode, NodePath, PathStep, Play, Playbook, Position};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Editing state for the playbook canvas.
#[derive(Debug, Clone, Default)]
pub struct EditorSession {
  playbooks: Vec<Playbook>,
  nodes: Vec<GraphNode>,
  edges: EdgeSet,
  path: NodePath,
  path_version: u64,
  policy: RootPolicy,
}

impl EditorSession {
  pub fn new(policy: RootPolicy) -> Self {
    Self {
      policy,
      ..Self::default()
    }
  }

  /// Session seeded from `playbooks`.
  pub fn with_playbooks(playbooks: Vec<Playbook>, policy: RootPolicy) -> Self {
    let mut session = Self::new(policy);
    session.load(playbooks);
    session
  }

  /// Replaces the node set with one node per play and merges the declared
  /// links into the edge set, then recomputes the path once.
  ///
  /// The declared links of `playbooks` are authoritative: a declared edge
  /// they no longer contain is dropped. User-drawn edges are kept while both
  /// endpoints are still nodes. A link declared from both ends is merged into
  /// one edge.
  pub fn load(&mut self, playbooks: Vec<Playbook>) {
    let built = build_graph(&playbooks);
    let mut seen = HashSet::with_capacity(built.nodes.len());
    self.nodes = built
      .nodes
      .into_iter()
      .filter(|n| {
        let fresh = seen.insert(n.id.clone());
        if !fresh {
          warn!(play_id = %n.id, "duplicate play id, keeping first node");
        }
        fresh
      })
      .collect();
    let declared: HashSet<EdgeId> = built.edges.iter().map(|e| e.id.clone()).collect();
    let removed = self.edges.retain(|e| match e.origin {
      EdgeOrigin::Declared { .. } => declared.contains(&e.id),
      EdgeOrigin::UserDrawn => seen.contains(&e.source) && seen.contains(&e.target),
    });
    let added = self.edges.merge_declared(built.edges);
    self.playbooks = playbooks;
    info!(
      playbooks = self.playbooks.len(),
      nodes = self.nodes.len(),
      edges_added = added,
      edges_removed = removed,
      "loaded playbooks"
    );
    self.refresh_path();
  }

  pub fn playbooks(&self) -> &[Playbook] {
    &self.playbooks
  }

  pub fn playbook(&self, playbook_id: &str) -> Option<&Playbook> {
    self.playbooks.iter().find(|pb| pb.id == playbook_id)
  }

  pub fn nodes(&self) -> &[GraphNode] {
    &self.nodes
  }

  pub fn node(&self, id: &str) -> Option<&GraphNode> {
    self.nodes.iter().find(|n| n.id == id)
  }

  pub fn edges(&self) -> &EdgeSet {
    &self.edges
  }

  pub fn path(&self) -> &NodePath {
    &self.path
  }

  /// Incremented on every path recomputation.
  pub fn path_version(&self) -> u64 {
    self.path_version
  }

  pub fn policy(&self) -> RootPolicy {
    self.policy
  }

  pub fn set_policy(&mut self, policy: RootPolicy) {
    if self.policy != policy {
      self.policy = policy;
      self.refresh_path();
    }
  }

  /// Adds a user-drawn edge `source -> target` as proposed.
  ///
  /// Returns the new edge id, or `None` when an edge with that canonical id
  /// already exists (nothing changes).
  pub fn connect(&mut self, source: &str, target: &str) -> Option<EdgeId> {
    let edge = GraphEdge::user_drawn(source, target);
    let id = edge.id.clone();
    if self.edges.add_if_absent([edge]) == 0 {
      debug!(edge = %id, "edge already present");
      return None;
    }
    self.refresh_path();
    Some(id)
  }

  /// Marks a proposed edge as acknowledged by the remote store. The path
  /// does not depend on edge state, so it is left as is.
  pub fn confirm_edge(&mut self, id: &EdgeId) -> bool {
    self.edges.confirm(id)
  }

  /// Deletes the selected edges. Returns how many were removed.
  pub fn delete_edges(&mut self, selected: &[EdgeId]) -> usize {
    let removed = self.edges.remove_matching(selected);
    if removed > 0 {
      self.refresh_path();
    }
    removed
  }

  /// Places the node of `play` at `position`.
  ///
  /// A play already on the canvas is moved rather than duplicated. Returns
  /// true when a new node was added.
  pub fn drop_node(&mut self, play: &Play, position: Position) -> bool {
    if let Some(existing) = self.nodes.iter_mut().find(|n| n.id == play.id) {
      existing.position = position;
      return false;
    }
    let mut node = build_node(play, 0, 0);
    node.position = position;
    self.nodes.push(node);
    self.refresh_path();
    true
  }

  /// Takes a play off the canvas together with every edge touching it.
  pub fn remove_play(&mut self, play_id: &str) -> bool {
    let before = self.nodes.len();
    self.nodes.retain(|n| n.id != play_id);
    let removed_node = self.nodes.len() != before;
    let removed_edges = self.edges.remove_touching(play_id);
    if removed_node || removed_edges > 0 {
      self.refresh_path();
    }
    removed_node
  }

  /// The current path with node labels, as sent to the execute endpoint.
  ///
  /// A path id with no node (not possible through this API) gets an empty
  /// description.
  pub fn labelled_path(&self) -> Vec<PathStep> {
    self
      .path
      .iter()
      .map(|id| PathStep {
        id: id.to_string(),
        description: self.node(id).map(|n| n.label.clone()).unwrap_or_default(),
      })
      .collect()
  }

  fn refresh_path(&mut self) {
    self.path = resolve_node_path(&self.nodes, self.edges.iter(), self.policy);
    self.path_version += 1;
    debug!(version = self.path_version, path = ?self.path.ids(), "node path updated");
  }
}
