//! Playbook snapshot save/load (JSON, in the service's wire format).

use crate::types::Playbook;
use crate::wire::{WireLibrary, deserialize_playbooks, serialize_playbooks};
use std::path::Path;
use tracing::instrument;

/// Default filename for a snapshot under a working directory.
pub const SNAPSHOT_FILENAME: &str = "playbooks.json";

/// Saves `playbooks` to `path` as pretty JSON, creating parent directories.
#[instrument(level = "trace", skip(path, playbooks))]
pub fn save_snapshot(path: &Path, playbooks: &[Playbook]) -> Result<(), std::io::Error> {
  let json = serde_json::to_string_pretty(&serialize_playbooks(playbooks))
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(path, json)
}

/// Loads playbooks from `path`. Returns error if the file is missing or is
/// not a playbook library.
#[instrument(level = "trace", skip(path))]
pub fn load_snapshot(path: &Path) -> Result<Vec<Playbook>, std::io::Error> {
  let bytes = std::fs::read(path)?;
  let library: WireLibrary = serde_json::from_slice(&bytes)
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
  Ok(deserialize_playbooks(library))
}
