//! A directed connection between two canvas nodes.

use std::fmt;

/// Canonical edge identity: the ordered endpoint pair.
///
/// Rendered as `edge-{source}-{target}`. The rendering is for display only;
/// equality and hashing use the pair, so ids that contain `-` never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId {
  source: String,
  target: String,
}

impl EdgeId {
  /// Canonical id for `source -> target`.
  pub fn for_pair(source: &str, target: &str) -> Self {
    EdgeId {
      source: source.to_string(),
      target: target.to_string(),
    }
  }

  pub fn source(&self) -> &str {
    &self.source
  }

  pub fn target(&self) -> &str {
    &self.target
  }
}

impl fmt::Display for EdgeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "edge-{}-{}", self.source, self.target)
  }
}

/// Where an edge came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeOrigin {
  /// Declared by a play's forward or backward links at load time.
  Declared {
    /// Name of the playbook whose play declared the link.
    playbook: String,
    /// Position of the declaration in the build, unique per build.
    sequence: u64,
  },
  /// Drawn by the user on the canvas.
  UserDrawn,
}

/// Whether the remote store is known to hold the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeState {
  Confirmed,
  /// Applied locally, not yet acknowledged by the service.
  Proposed,
}

/// A directed edge between two plays.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
  pub id: EdgeId,
  pub source: String,
  pub target: String,
  pub origin: EdgeOrigin,
  pub state: EdgeState,
}

impl GraphEdge {
  /// Confirmed edge declared by `playbook` at build position `sequence`.
  pub fn declared(
    source: impl Into<String>,
    target: impl Into<String>,
    playbook: impl Into<String>,
    sequence: u64,
  ) -> Self {
    let source = source.into();
    let target = target.into();
    Self {
      id: EdgeId::for_pair(&source, &target),
      source,
      target,
      origin: EdgeOrigin::Declared {
        playbook: playbook.into(),
        sequence,
      },
      state: EdgeState::Confirmed,
    }
  }

  /// Proposed edge drawn by the user.
  pub fn user_drawn(source: impl Into<String>, target: impl Into<String>) -> Self {
    let source = source.into();
    let target = target.into();
    Self {
      id: EdgeId::for_pair(&source, &target),
      source,
      target,
      origin: EdgeOrigin::UserDrawn,
      state: EdgeState::Proposed,
    }
  }

  /// Per-declaration id `edge-{playbook}-{source}-{target}-{sequence}`.
  ///
  /// Distinguishes the forward and backward declarations of one logical edge.
  /// `None` for user-drawn edges.
  pub fn declaration_id(&self) -> Option<String> {
    match &self.origin {
      EdgeOrigin::Declared { playbook, sequence } => Some(format!(
        "edge-{}-{}-{}-{}",
        playbook, self.source, self.target, sequence
      )),
      EdgeOrigin::UserDrawn => None,
    }
  }

  pub fn is_confirmed(&self) -> bool {
    self.state == EdgeState::Confirmed
  }

  pub fn touches(&self, node_id: &str) -> bool {
    self.source == node_id || self.target == node_id
  }
}
