//! Builds canvas nodes and edges from playbooks.
//!
//! Pure and deterministic: the same playbooks always yield the same nodes,
//! positions and edges. Layout is a fixed grid (play index across, playbook
//! index down); the user repositions nodes afterwards.

use crate::types::{CompletionState, GraphEdge, GraphNode, Play, Playbook, Position};
use tracing::{debug, instrument};

/// Horizontal distance between consecutive plays of one playbook.
pub const NODE_SPACING_X: f64 = 200.0;
/// Vertical distance between consecutive playbooks.
pub const NODE_SPACING_Y: f64 = 150.0;

/// Nodes and (possibly duplicated) edges produced by [build_graph].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuiltGraph {
  pub nodes: Vec<GraphNode>,
  /// One edge per link declaration. A link declared from both ends appears
  /// twice under the same canonical id; merge into an
  /// [EdgeSet](crate::edge_set::EdgeSet) to collapse.
  pub edges: Vec<GraphEdge>,
}

/// Grid position of the play at `play_index` in the playbook at `playbook_index`.
pub fn grid_position(play_index: usize, playbook_index: usize) -> Position {
  Position::new(
    play_index as f64 * NODE_SPACING_X,
    playbook_index as f64 * NODE_SPACING_Y,
  )
}

/// Canvas node for one play.
pub fn build_node(play: &Play, play_index: usize, playbook_index: usize) -> GraphNode {
  GraphNode {
    id: play.id.clone(),
    playbook_id: play.playbook_id.clone(),
    position: grid_position(play_index, playbook_index),
    label: play.description.clone(),
    state: CompletionState::from_completed(play.completed),
  }
}

/// Edges declared by one play: forward links first, then backward links.
///
/// `sequence` is the build-wide declaration counter; it is advanced once per
/// emitted edge.
pub(crate) fn declared_edges(play: &Play, sequence: &mut u64) -> Vec<GraphEdge> {
  let forward = play.forward_links.iter().map(|target| (play.id.as_str(), target.as_str()));
  let backward = play.backward_links.iter().map(|source| (source.as_str(), play.id.as_str()));
  forward
    .chain(backward)
    .map(|(source, target)| {
      let edge = GraphEdge::declared(source, target, play.playbook_id.as_str(), *sequence);
      *sequence += 1;
      edge
    })
    .collect()
}

/// Converts playbooks into one node per play and one edge per link declaration.
#[instrument(level = "trace", skip(playbooks))]
pub fn build_graph(playbooks: &[Playbook]) -> BuiltGraph {
  let mut built = BuiltGraph::default();
  let mut sequence = 0u64;
  for (playbook_index, playbook) in playbooks.iter().enumerate() {
    for (play_index, play) in playbook.plays.iter().enumerate() {
      built.nodes.push(build_node(play, play_index, playbook_index));
      built.edges.extend(declared_edges(play, &mut sequence));
    }
  }
  debug!(
    nodes = built.nodes.len(),
    edges = built.edges.len(),
    "built playbook graph"
  );
  built
}
