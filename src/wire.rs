//! Transport adapter: wire records of the playbook service to [Playbook]/[Play] and back.
//!
//! The service returns a JSON object mapping playbook id to playbook record.
//! Entry order is preserved in both directions. Null or missing link arrays
//! become empty lists so nothing downstream checks for absence.

use crate::service::PlaybookService;
use crate::types::{Play, Playbook};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument};

/// Playbook library as sent by the service: playbook id to record, in service order.
pub type WireLibrary = IndexMap<String, WirePlaybook>;

/// Wire form of a [Playbook].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WirePlaybook {
  #[serde(default)]
  pub id: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub name: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub category: String,
  #[serde(default)]
  pub ip: Option<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub plays: Vec<WirePlay>,
}

/// Wire form of a [Play].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WirePlay {
  pub id: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub playbook_name: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub description: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub completed: bool,
  #[serde(default)]
  pub context: Value,
  #[serde(default)]
  pub result: Value,
  #[serde(default, deserialize_with = "null_as_default")]
  pub backward_links: Vec<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub forward_links: Vec<String>,
  #[serde(default)]
  pub ip: Option<String>,
}

/// Deserializes `null` as `T::default()`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl From<WirePlay> for Play {
  fn from(w: WirePlay) -> Self {
    Play {
      id: w.id,
      playbook_id: w.playbook_name,
      description: w.description,
      completed: w.completed,
      context: w.context,
      result: w.result,
      forward_links: w.forward_links,
      backward_links: w.backward_links,
      ip: w.ip,
    }
  }
}

impl From<&Play> for WirePlay {
  fn from(p: &Play) -> Self {
    WirePlay {
      id: p.id.clone(),
      playbook_name: p.playbook_id.clone(),
      description: p.description.clone(),
      completed: p.completed,
      context: p.context.clone(),
      result: p.result.clone(),
      backward_links: p.backward_links.clone(),
      forward_links: p.forward_links.clone(),
      ip: p.ip.clone(),
    }
  }
}

/// Builds one [Playbook] per library entry, in library order.
///
/// A record without an `id` takes its key in the mapping.
#[instrument(level = "trace", skip(library))]
pub fn deserialize_playbooks(library: WireLibrary) -> Vec<Playbook> {
  library
    .into_iter()
    .map(|(key, w)| Playbook {
      id: if w.id.is_empty() { key } else { w.id },
      name: w.name,
      category: w.category,
      ip: w.ip,
      plays: w.plays.into_iter().map(Play::from).collect(),
    })
    .collect()
}

/// Inverse of [deserialize_playbooks]: keyed by playbook id, in slice order.
#[instrument(level = "trace", skip(playbooks))]
pub fn serialize_playbooks(playbooks: &[Playbook]) -> WireLibrary {
  playbooks
    .iter()
    .map(|pb| {
      (
        pb.id.clone(),
        WirePlaybook {
          id: pb.id.clone(),
          name: pb.name.clone(),
          category: pb.category.clone(),
          ip: pb.ip.clone(),
          plays: pb.plays.iter().map(WirePlay::from).collect(),
        },
      )
    })
    .collect()
}

/// Parses a JSON library document.
pub fn parse_playbooks(json: &str) -> Result<Vec<Playbook>, serde_json::Error> {
  let library: WireLibrary = serde_json::from_str(json)?;
  Ok(deserialize_playbooks(library))
}

/// Renders playbooks as a pretty-printed JSON library document.
pub fn render_playbooks(playbooks: &[Playbook]) -> Result<String, serde_json::Error> {
  serde_json::to_string_pretty(&serialize_playbooks(playbooks))
}

/// Fetches and normalizes every playbook.
///
/// Returns `None` when the fetch or the decode fails: callers treat that as
/// "nothing fetched" and keep their current state.
pub async fn fetch_all_playbooks<S>(service: &S) -> Option<Vec<Playbook>>
where
  S: PlaybookService + ?Sized,
{
  match service.fetch_all_playbooks().await {
    Ok(library) => {
      let playbooks = deserialize_playbooks(library);
      info!(count = playbooks.len(), "fetched playbooks");
      Some(playbooks)
    }
    Err(e) => {
      error!(error = %e, "error fetching playbooks");
      None
    }
  }
}
