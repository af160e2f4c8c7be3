//! Edge collection with set semantics keyed by [EdgeId].
//!
//! Insertion order is kept: the path resolver follows outgoing edges in the
//! order they were added.

use crate::types::{EdgeId, EdgeState, GraphEdge};
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Ordered set of edges, one entry per id.
#[derive(Debug, Clone, Default)]
pub struct EdgeSet {
  edges: IndexMap<EdgeId, GraphEdge>,
}

impl EdgeSet {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.edges.len()
  }

  pub fn is_empty(&self) -> bool {
    self.edges.is_empty()
  }

  pub fn contains(&self, id: &EdgeId) -> bool {
    self.edges.contains_key(id)
  }

  pub fn get(&self, id: &EdgeId) -> Option<&GraphEdge> {
    self.edges.get(id)
  }

  /// Edges in insertion order.
  pub fn iter(&self) -> impl Iterator<Item = &GraphEdge> {
    self.edges.values()
  }

  pub fn to_vec(&self) -> Vec<GraphEdge> {
    self.edges.values().cloned().collect()
  }

  /// Inserts every edge whose id is not yet present, in order.
  ///
  /// Existing entries keep their payload and position; an id repeated within
  /// `edges` is inserted once (first occurrence). Returns how many were inserted.
  #[instrument(level = "trace", skip(self, edges))]
  pub fn add_if_absent<I>(&mut self, edges: I) -> usize
  where
    I: IntoIterator<Item = GraphEdge>,
  {
    let before = self.edges.len();
    for edge in edges {
      if !self.edges.contains_key(&edge.id) {
        self.edges.insert(edge.id.clone(), edge);
      }
    }
    let added = self.edges.len() - before;
    debug!(added, total = self.edges.len(), "added unique edges");
    added
  }

  /// Union of a freshly built batch into the set.
  ///
  /// The batch is collapsed with [deduplicate] first, so a link declared from
  /// both of its ends contributes one edge. Returns how many were inserted.
  pub fn merge_declared(&mut self, edges: Vec<GraphEdge>) -> usize {
    self.add_if_absent(deduplicate(edges))
  }

  /// Removes every edge whose id is in `ids`. Returns how many were removed.
  #[instrument(level = "trace", skip(self, ids))]
  pub fn remove_matching<'a, I>(&mut self, ids: I) -> usize
  where
    I: IntoIterator<Item = &'a EdgeId>,
  {
    let doomed: HashSet<&EdgeId> = ids.into_iter().collect();
    if doomed.is_empty() {
      return 0;
    }
    let before = self.edges.len();
    self.edges.retain(|id, _| !doomed.contains(id));
    let removed = before - self.edges.len();
    debug!(removed, total = self.edges.len(), "removed edges");
    removed
  }

  /// Removes every edge with `node_id` as source or target.
  pub fn remove_touching(&mut self, node_id: &str) -> usize {
    let before = self.edges.len();
    self.edges.retain(|_, e| !e.touches(node_id));
    before - self.edges.len()
  }

  /// Keeps only the edges for which `keep` returns true. Returns how many
  /// were removed.
  pub fn retain<F>(&mut self, mut keep: F) -> usize
  where
    F: FnMut(&GraphEdge) -> bool,
  {
    let before = self.edges.len();
    self.edges.retain(|_, e| keep(e));
    before - self.edges.len()
  }

  /// Marks a proposed edge as acknowledged by the remote store.
  ///
  /// Returns false when the edge is absent or already confirmed.
  pub fn confirm(&mut self, id: &EdgeId) -> bool {
    match self.edges.get_mut(id) {
      Some(edge) if edge.state == EdgeState::Proposed => {
        edge.state = EdgeState::Confirmed;
        true
      }
      _ => false,
    }
  }

  /// Edges still waiting for remote acknowledgement.
  pub fn proposed(&self) -> impl Iterator<Item = &GraphEdge> {
    self.edges.values().filter(|e| e.state == EdgeState::Proposed)
  }

  pub fn clear(&mut self) {
    self.edges.clear();
  }
}

impl FromIterator<GraphEdge> for EdgeSet {
  fn from_iter<T: IntoIterator<Item = GraphEdge>>(iter: T) -> Self {
    let mut set = EdgeSet::new();
    set.add_if_absent(iter);
    set
  }
}

/// Collapses `edges` to one entry per id.
///
/// Each id keeps the position of its first occurrence and the payload of its
/// last occurrence.
pub fn deduplicate(edges: Vec<GraphEdge>) -> Vec<GraphEdge> {
  let mut by_id: IndexMap<EdgeId, GraphEdge> = IndexMap::with_capacity(edges.len());
  for edge in edges {
    by_id.insert(edge.id.clone(), edge);
  }
  by_id.into_values().collect()
}
