//! Log records fetched from the playbook service for display.
//!
//! These are shown to the user as-is and never feed back into the graph or
//! the node path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One command run inside the playbook's container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DockerLogEntry {
  #[serde(default)]
  pub command: String,
  #[serde(default)]
  pub output: String,
}

/// One context record produced while executing a play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextLogEntry {
  #[serde(default)]
  pub play: String,
  #[serde(default)]
  pub command: String,
  #[serde(default)]
  pub result: Value,
  #[serde(default)]
  pub context: Value,
}

/// Which context logs to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogScope {
  /// Logs of one playbook, by playbook id.
  Playbook(String),
  /// Logs across all playbooks.
  Global,
}

/// Logs fetched on one polling tick.
#[derive(Debug, Clone, Serialize)]
pub struct LogSnapshot {
  /// 1-based tick number within the polling window.
  pub tick: u32,
  pub fetched_at: DateTime<Utc>,
  /// Empty when the scope is global; docker logs are per playbook.
  pub docker: Vec<DockerLogEntry>,
  pub context: Vec<ContextLogEntry>,
}
