//! A named, categorized collection of plays.

use super::Play;

/// A named, categorized collection of plays.
#[derive(Debug, Clone, PartialEq)]
pub struct Playbook {
  pub id: String,
  pub name: String,
  pub category: String,
  pub ip: Option<String>,
  /// Plays in display order.
  pub plays: Vec<Play>,
}

impl Playbook {
  pub fn new(
    id: impl Into<String>,
    name: impl Into<String>,
    category: impl Into<String>,
  ) -> Self {
    Self {
      id: id.into(),
      name: name.into(),
      category: category.into(),
      ip: None,
      plays: Vec::new(),
    }
  }

  pub fn with_plays(mut self, plays: Vec<Play>) -> Self {
    self.plays = plays;
    self
  }

  /// Key used in the service's mutating routes (`/playbook/{key}/...`).
  ///
  /// The service addresses playbooks by name for connect, play creation and
  /// execution; log routes use [`Playbook::id`](Playbook) instead.
  pub fn route_key(&self) -> &str {
    &self.name
  }

  pub fn play(&self, play_id: &str) -> Option<&Play> {
    self.plays.iter().find(|p| p.id == play_id)
  }
}

/// Finds a play by id across all playbooks.
pub fn find_play<'a>(playbooks: &'a [Playbook], play_id: &str) -> Option<&'a Play> {
  playbooks.iter().find_map(|pb| pb.play(play_id))
}

/// Returns `(playbook name, play description)` for display, if both exist.
pub fn play_and_playbook_names<'a>(
  playbooks: &'a [Playbook],
  playbook_id: &str,
  play_id: &str,
) -> Option<(&'a str, &'a str)> {
  let playbook = playbooks.iter().find(|pb| pb.id == playbook_id)?;
  let play = playbook.play(play_id)?;
  Some((playbook.name.as_str(), play.description.as_str()))
}
