//! Derives the node path from the current nodes and edges.
//!
//! Roots are the nodes, in node order, that are the source of at least one
//! edge. Each root is walked depth-first, following outgoing edges in edge
//! order, and every node is recorded the first time it is reached. This is a
//! first-discovery order, not a topological sort: in a diamond the join node
//! is recorded once, under whichever branch reaches it first.

use crate::types::{GraphEdge, GraphNode, NodePath};
use std::collections::{HashMap, HashSet};
use tracing::{instrument, trace};

/// Which nodes may start or appear in a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RootPolicy {
  /// Only sources of an edge start a walk; nodes with no incident edge never
  /// appear.
  #[default]
  SourcesOnly,
  /// As [RootPolicy::SourcesOnly], then every node with no incident edge is
  /// appended, in node order.
  IncludeIsolated,
}

/// Resolves the node path as one segment per root that recorded something.
#[instrument(level = "trace", skip(nodes, edges))]
pub fn resolve_segments<'e, E>(
  nodes: &[GraphNode],
  edges: E,
  policy: RootPolicy,
) -> Vec<Vec<String>>
where
  E: IntoIterator<Item = &'e GraphEdge>,
{
  let node_ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

  // Outgoing targets per source, in edge order; edges leaving the node set
  // are dropped here and never followed.
  let mut outgoing: HashMap<&str, Vec<&str>> = HashMap::new();
  let mut touched: HashSet<&str> = HashSet::new();
  for edge in edges {
    touched.insert(edge.source.as_str());
    touched.insert(edge.target.as_str());
    let targets = outgoing.entry(edge.source.as_str()).or_default();
    if node_ids.contains(edge.target.as_str()) {
      targets.push(edge.target.as_str());
    }
  }

  let mut visited: HashSet<&str> = HashSet::new();
  let mut segments = Vec::new();
  for root in nodes.iter().filter(|n| outgoing.contains_key(n.id.as_str())) {
    let segment = walk(root.id.as_str(), &outgoing, &mut visited);
    if !segment.is_empty() {
      trace!(root = %root.id, len = segment.len(), "resolved segment");
      segments.push(segment);
    }
  }

  if policy == RootPolicy::IncludeIsolated {
    for node in nodes {
      let id = node.id.as_str();
      if !touched.contains(id) && visited.insert(id) {
        segments.push(vec![node.id.clone()]);
      }
    }
  }
  segments
}

/// Resolves the flat node path: segments concatenated in root order.
pub fn resolve_node_path<'e, E>(nodes: &[GraphNode], edges: E, policy: RootPolicy) -> NodePath
where
  E: IntoIterator<Item = &'e GraphEdge>,
{
  let ids = resolve_segments(nodes, edges, policy)
    .into_iter()
    .flatten()
    .collect();
  NodePath::from_unique(ids)
}

/// Iterative pre-order walk from `root`, skipping anything already visited.
fn walk<'a>(
  root: &'a str,
  outgoing: &HashMap<&'a str, Vec<&'a str>>,
  visited: &mut HashSet<&'a str>,
) -> Vec<String> {
  let mut recorded = Vec::new();
  let mut stack = vec![root];
  while let Some(id) = stack.pop() {
    if !visited.insert(id) {
      continue;
    }
    recorded.push(id.to_string());
    if let Some(targets) = outgoing.get(id) {
      // Reversed so the first outgoing edge is explored first.
      stack.extend(targets.iter().rev().copied().filter(|t| !visited.contains(t)));
    }
  }
  recorded
}
