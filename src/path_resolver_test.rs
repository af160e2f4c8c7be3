//! Tests for node path resolution.

use crate::path_resolver::{RootPolicy, resolve_node_path, resolve_segments};
use crate::types::{CompletionState, GraphEdge, GraphNode, Position};
use proptest::prelude::*;
use std::collections::HashSet;

fn nodes(ids: &[&str]) -> Vec<GraphNode> {
  ids
    .iter()
    .map(|id| GraphNode {
      id: id.to_string(),
      playbook_id: "P".to_string(),
      position: Position::default(),
      label: id.to_string(),
      state: CompletionState::Pending,
    })
    .collect()
}

fn edges(pairs: &[(&str, &str)]) -> Vec<GraphEdge> {
  pairs
    .iter()
    .enumerate()
    .map(|(i, (s, t))| GraphEdge::declared(*s, *t, "P", i as u64))
    .collect()
}

fn path(node_ids: &[&str], pairs: &[(&str, &str)], policy: RootPolicy) -> Vec<String> {
  resolve_node_path(&nodes(node_ids), &edges(pairs), policy).into_ids()
}

#[test]
fn single_link_resolves_source_then_target() {
  assert_eq!(
    path(&["n1", "n2"], &[("n1", "n2")], RootPolicy::SourcesOnly),
    vec!["n1", "n2"]
  );
}

#[test]
fn diamond_join_is_recorded_under_first_branch() {
  let p = path(
    &["A", "B", "C", "D"],
    &[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")],
    RootPolicy::SourcesOnly,
  );
  assert_eq!(p, vec!["A", "B", "D", "C"]);
}

#[test]
fn cycle_terminates_with_each_node_once() {
  let p = path(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "a")], RootPolicy::SourcesOnly);
  assert_eq!(p, vec!["a", "b", "c"]);
}

#[test]
fn two_node_cycle_terminates() {
  let p = path(&["A", "B"], &[("A", "B"), ("B", "A")], RootPolicy::SourcesOnly);
  assert_eq!(p, vec!["A", "B"]);
}

#[test]
fn self_loop_records_node_once() {
  assert_eq!(path(&["a"], &[("a", "a")], RootPolicy::SourcesOnly), vec!["a"]);
}

#[test]
fn edges_to_missing_nodes_are_not_followed() {
  let p = path(&["a", "b"], &[("a", "ghost"), ("a", "b")], RootPolicy::SourcesOnly);
  assert_eq!(p, vec!["a", "b"]);
  // A source that is not a node starts nothing.
  let p = path(&["b"], &[("ghost", "b")], RootPolicy::SourcesOnly);
  assert!(p.is_empty());
}

#[test]
fn isolated_nodes_are_omitted_by_default() {
  let p = path(&["lonely", "a", "b"], &[("a", "b")], RootPolicy::SourcesOnly);
  assert_eq!(p, vec!["a", "b"]);
}

#[test]
fn include_isolated_appends_unconnected_nodes_in_node_order() {
  let p = path(
    &["lonely", "a", "b", "alone"],
    &[("a", "b")],
    RootPolicy::IncludeIsolated,
  );
  assert_eq!(p, vec!["a", "b", "lonely", "alone"]);
}

#[test]
fn roots_follow_node_order_and_skip_visited() {
  let segments = resolve_segments(
    &nodes(&["x", "a", "b", "c"]),
    &edges(&[("a", "b"), ("x", "c"), ("b", "c")]),
    RootPolicy::SourcesOnly,
  );
  assert_eq!(
    segments,
    vec![
      vec!["x".to_string(), "c".to_string()],
      vec!["a".to_string(), "b".to_string()],
    ]
  );
}

#[test]
fn outgoing_edges_follow_edge_order() {
  let p = path(&["r", "y", "z"], &[("r", "z"), ("r", "y")], RootPolicy::SourcesOnly);
  assert_eq!(p, vec!["r", "z", "y"]);
}

#[test]
fn empty_graph_resolves_empty_path() {
  assert!(resolve_node_path(&[], &Vec::<GraphEdge>::new(), RootPolicy::IncludeIsolated).is_empty());
}

fn arb_graph() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
  (1usize..10).prop_flat_map(|n| (Just(n), prop::collection::vec((0..n, 0..n), 0..25)))
}

fn build((n, pairs): &(usize, Vec<(usize, usize)>)) -> (Vec<GraphNode>, Vec<GraphEdge>) {
  let ids: Vec<String> = (0..*n).map(|i| format!("v{i}")).collect();
  let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
  let nodes = nodes(&id_refs);
  let edges = pairs
    .iter()
    .enumerate()
    .map(|(i, (s, t))| GraphEdge::declared(format!("v{s}"), format!("v{t}"), "P", i as u64))
    .collect();
  (nodes, edges)
}

proptest! {
  #[test]
  fn path_has_no_duplicates(graph in arb_graph()) {
    let (nodes, edges) = build(&graph);
    for policy in [RootPolicy::SourcesOnly, RootPolicy::IncludeIsolated] {
      let p = resolve_node_path(&nodes, &edges, policy);
      let unique: HashSet<&str> = p.iter().collect();
      prop_assert_eq!(unique.len(), p.len());
    }
  }

  #[test]
  fn include_isolated_covers_every_node(graph in arb_graph()) {
    let (nodes, edges) = build(&graph);
    let p = resolve_node_path(&nodes, &edges, RootPolicy::IncludeIsolated);
    prop_assert_eq!(p.len(), nodes.len());
  }

  #[test]
  fn acyclic_segments_never_place_a_node_before_its_discoverer(graph in arb_graph()) {
    let (nodes, all_edges) = build(&graph);
    // Keep only forward edges so the graph is a DAG.
    let edges: Vec<GraphEdge> = all_edges
      .into_iter()
      .filter(|e| e.source[1..].parse::<usize>().unwrap() < e.target[1..].parse::<usize>().unwrap())
      .collect();
    for segment in resolve_segments(&nodes, &edges, RootPolicy::SourcesOnly) {
      for (i, id) in segment.iter().enumerate().skip(1) {
        let discovered = edges
          .iter()
          .any(|e| &e.target == id && segment[..i].contains(&e.source));
        prop_assert!(discovered, "{} has no predecessor earlier in its segment", id);
      }
    }
  }
}
