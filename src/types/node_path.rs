//! Resolved linear execution order.

/// Ordered play ids with no repeats. Derived from the graph, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodePath {
  ids: Vec<String>,
}

impl NodePath {
  /// Caller guarantees `ids` holds no repeats.
  pub(crate) fn from_unique(ids: Vec<String>) -> Self {
    Self { ids }
  }

  pub fn ids(&self) -> &[String] {
    &self.ids
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.ids.iter().map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.ids.len()
  }

  pub fn is_empty(&self) -> bool {
    self.ids.is_empty()
  }

  pub fn contains(&self, id: &str) -> bool {
    self.ids.iter().any(|i| i == id)
  }

  /// Zero-based position of `id` in the path.
  pub fn position(&self, id: &str) -> Option<usize> {
    self.ids.iter().position(|i| i == id)
  }

  pub fn into_ids(self) -> Vec<String> {
    self.ids
  }
}

/// One step of the execute-node-path request: a play id and its description.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PathStep {
  pub id: String,
  pub description: String,
}
