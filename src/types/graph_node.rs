//! A canvas node standing for exactly one play.

/// Canvas coordinates of a node.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
  pub x: f64,
  pub y: f64,
}

impl Position {
  pub fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }
}

/// Border shared by both completion states.
pub const NODE_BORDER: &str = "1px solid #333";

/// Visual state derived from `Play::completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionState {
  Completed,
  Pending,
}

impl CompletionState {
  pub fn from_completed(completed: bool) -> Self {
    if completed {
      CompletionState::Completed
    } else {
      CompletionState::Pending
    }
  }

  /// Background colour used by the canvas.
  pub fn background(self) -> &'static str {
    match self {
      CompletionState::Completed => "#A7F3D0",
      CompletionState::Pending => "#FCA5A5",
    }
  }

  pub fn is_completed(self) -> bool {
    self == CompletionState::Completed
  }
}

/// A node on the editing canvas. `id` equals the play id.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
  pub id: String,
  pub playbook_id: String,
  pub position: Position,
  /// Play description shown on the node.
  pub label: String,
  pub state: CompletionState,
}
