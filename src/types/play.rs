//! A single actionable step of a playbook.

use serde_json::Value;

/// A single actionable step belonging to a playbook.
///
/// Link lists are never absent: the transport adapter normalizes missing
/// arrays to empty vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct Play {
  /// Globally unique play id (unique across all playbooks).
  pub id: String,
  /// Owning playbook. Travels as `playbook_name` on the wire.
  pub playbook_id: String,
  pub description: String,
  pub completed: bool,
  /// Opaque execution context, carried verbatim.
  pub context: Value,
  /// Opaque execution result, carried verbatim.
  pub result: Value,
  /// Successor play ids, in declaration order.
  pub forward_links: Vec<String>,
  /// Predecessor play ids, in declaration order.
  pub backward_links: Vec<String>,
  pub ip: Option<String>,
}

impl Play {
  /// Creates a pending play with no links.
  pub fn new(
    id: impl Into<String>,
    playbook_id: impl Into<String>,
    description: impl Into<String>,
  ) -> Self {
    Self {
      id: id.into(),
      playbook_id: playbook_id.into(),
      description: description.into(),
      completed: false,
      context: Value::Null,
      result: Value::Null,
      forward_links: Vec::new(),
      backward_links: Vec::new(),
      ip: None,
    }
  }

  pub fn with_forward_links<I, S>(mut self, links: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.forward_links = links.into_iter().map(Into::into).collect();
    self
  }

  pub fn with_backward_links<I, S>(mut self, links: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.backward_links = links.into_iter().map(Into::into).collect();
    self
  }

  pub fn completed(mut self, completed: bool) -> Self {
    self.completed = completed;
    self
  }
}
