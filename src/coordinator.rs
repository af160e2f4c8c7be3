//! Execution coordinator: turns session actions into calls on the playbook
//! service and reports the outcome as a [Notice].
//!
//! The session and the selected playbook are passed into every call. Local
//! edits are applied before the service is contacted and are never rolled
//! back: a failed connect leaves the edge [Proposed](crate::types::EdgeState),
//! which is how the gap between local and remote state stays visible.

use crate::config::Config;
use crate::log_poller::PollingWindow;
use crate::service::PlaybookService;
use crate::session::EditorSession;
use crate::types::{EdgeId, LogScope, Notice};
use crate::wire::fetch_all_playbooks;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Result of a user connect action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOutcome {
  /// Id of the edge the action applied to, `None` when it was already
  /// confirmed.
  pub edge: Option<EdgeId>,
  /// Whether the service acknowledged the connection.
  pub confirmed: bool,
  /// Message for the user, if any.
  pub notice: Option<Notice>,
}

/// Drives remote execution from the editing session.
pub struct ExecutionCoordinator<S: PlaybookService + ?Sized + 'static> {
  service: Arc<S>,
  poll_interval: Duration,
  poll_window: Duration,
  polling: Option<PollingWindow>,
}

impl<S: PlaybookService + ?Sized + 'static> ExecutionCoordinator<S> {
  pub fn new(service: Arc<S>, config: &Config) -> Self {
    Self::with_polling(service, config.poll_interval, config.poll_window)
  }

  pub fn with_polling(service: Arc<S>, poll_interval: Duration, poll_window: Duration) -> Self {
    Self {
      service,
      poll_interval,
      poll_window,
      polling: None,
    }
  }

  pub fn service(&self) -> &Arc<S> {
    &self.service
  }

  /// The polling window opened by the last successful execution, if any.
  pub fn polling_window(&mut self) -> Option<&mut PollingWindow> {
    self.polling.as_mut()
  }

  /// Hands the current polling window to the caller.
  pub fn take_polling_window(&mut self) -> Option<PollingWindow> {
    self.polling.take()
  }

  /// Cancels and discards the current polling window.
  pub fn stop_polling(&mut self) {
    if let Some(window) = self.polling.take() {
      window.cancel();
    }
  }

  /// Re-fetches every playbook and loads it into `session`.
  ///
  /// On failure the session is left untouched.
  pub async fn reload(&self, session: &mut EditorSession) -> Notice {
    match fetch_all_playbooks(self.service.as_ref()).await {
      Some(playbooks) => {
        let count = playbooks.len();
        session.load(playbooks);
        Notice::info(format!("Loaded {count} playbooks"))
      }
      None => Notice::error("Failed to fetch playbooks"),
    }
  }

  /// Connects `source -> target` locally, then tells the service.
  ///
  /// Drawing an edge that is still proposed re-sends its remote connect
  /// without touching the path; only a confirmed edge is reported as already
  /// connected.
  ///
  /// The service is only told when a playbook is selected and both endpoints
  /// are on the canvas; it identifies plays by description.
  pub async fn connect(
    &self,
    session: &mut EditorSession,
    selected_playbook: Option<&str>,
    source: &str,
    target: &str,
  ) -> ConnectOutcome {
    // A proposed edge drawn again is a retry of its remote connect.
    let edge = match session.connect(source, target) {
      Some(edge) => edge,
      None => {
        let existing = EdgeId::for_pair(source, target);
        if session.edges().get(&existing).is_none_or(|e| e.is_confirmed()) {
          return ConnectOutcome {
            edge: None,
            confirmed: false,
            notice: Some(Notice::info(format!("{source} is already connected to {target}"))),
          };
        }
        debug!(edge = %existing, "retrying connect of proposed edge");
        existing
      }
    };

    let Some(playbook_id) = selected_playbook else {
      return ConnectOutcome {
        edge: Some(edge),
        confirmed: false,
        notice: None,
      };
    };
    let route = match session.playbook(playbook_id) {
      Some(pb) => pb.route_key().to_string(),
      None => {
        warn!(playbook = %playbook_id, "selected playbook not loaded, connect kept local");
        return ConnectOutcome {
          edge: Some(edge),
          confirmed: false,
          notice: None,
        };
      }
    };
    let (Some(parent), Some(child)) = (session.node(source), session.node(target)) else {
      warn!(%source, %target, "endpoint not on canvas, connect kept local");
      return ConnectOutcome {
        edge: Some(edge),
        confirmed: false,
        notice: None,
      };
    };
    let (parent, child) = (parent.label.clone(), child.label.clone());

    match self.service.connect(&route, &parent, &child).await {
      Ok(()) => {
        session.confirm_edge(&edge);
        info!(playbook = %route, %parent, %child, "connected plays in backend");
        ConnectOutcome {
          edge: Some(edge),
          confirmed: true,
          notice: Some(Notice::info(format!("Connected '{parent}' to '{child}'"))),
        }
      }
      Err(e) => {
        error!(error = %e, playbook = %route, "error connecting plays in backend");
        ConnectOutcome {
          edge: Some(edge),
          confirmed: false,
          notice: Some(Notice::error(format!("Failed to connect '{parent}' to '{child}': {e}"))),
        }
      }
    }
  }

  /// Executes every play of a playbook, then polls its logs.
  pub async fn execute_playbook(&mut self, session: &EditorSession, playbook_id: &str) -> Notice {
    let Some(playbook) = session.playbook(playbook_id) else {
      return Notice::error(format!("Unknown playbook {playbook_id}"));
    };
    match self.service.execute_all(playbook.route_key()).await {
      Ok(ack) => {
        info!(playbook = %playbook.name, ?ack, "executed playbook");
        self.open_polling(LogScope::Playbook(playbook.id.clone()));
        Notice::info(format!("Playbook '{}' executed!", playbook.name))
      }
      Err(e) => {
        error!(error = %e, playbook = %playbook.name, "error executing playbook");
        Notice::error(format!("Playbook execution failed: {e}"))
      }
    }
  }

  /// Executes one play of a playbook, then polls the playbook's logs.
  pub async fn execute_play(
    &mut self,
    session: &EditorSession,
    playbook_id: &str,
    play_id: &str,
  ) -> Notice {
    let Some(playbook) = session.playbook(playbook_id) else {
      return Notice::error(format!("Unknown playbook {playbook_id}"));
    };
    if play_id.is_empty() {
      return Notice::error("No play selected");
    }
    match self.service.execute_single(playbook.route_key(), play_id).await {
      Ok(ack) => {
        info!(playbook = %playbook.name, %play_id, ?ack, "executed single play");
        self.open_polling(LogScope::Playbook(playbook.id.clone()));
        Notice::info("Single play executed!")
      }
      Err(e) => {
        error!(error = %e, playbook = %playbook.name, %play_id, "error executing single play");
        Notice::error(format!("Single-play execution failed: {e}"))
      }
    }
  }

  /// Sends the session's current node path for execution, then polls the
  /// global context logs.
  pub async fn execute_node_path(&mut self, session: &EditorSession) -> Notice {
    let steps = session.labelled_path();
    if steps.is_empty() {
      return Notice::error("Node path is empty");
    }
    match self.service.execute_node_path(&steps).await {
      Ok(ack) => {
        info!(steps = steps.len(), ?ack, "executed node path");
        self.open_polling(LogScope::Global);
        Notice::info("Execution via node path successful!")
      }
      Err(e) => {
        error!(error = %e, "error during node path execution");
        Notice::error(format!("Execution failed: {e}"))
      }
    }
  }

  /// Creates a playbook, then reloads the session.
  pub async fn create_playbook(
    &self,
    session: &mut EditorSession,
    name: &str,
    category: &str,
  ) -> Notice {
    if name.trim().is_empty() || category.trim().is_empty() {
      return Notice::error("Playbook name and category are required");
    }
    if let Err(e) = self.service.create_playbook(name, category).await {
      error!(error = %e, %name, "error creating playbook");
      return Notice::error(format!("Failed to create playbook: {e}"));
    }
    let reloaded = self.reload(session).await;
    if reloaded.is_error() {
      return reloaded;
    }
    Notice::info("Playbook created successfully!")
  }

  /// Adds a play to a playbook, then reloads the session.
  pub async fn create_play(
    &self,
    session: &mut EditorSession,
    playbook_id: &str,
    description: &str,
  ) -> Notice {
    if description.trim().is_empty() {
      return Notice::error("Play description is required");
    }
    let Some(route) = session.playbook(playbook_id).map(|pb| pb.route_key().to_string()) else {
      return Notice::error(format!("Unknown playbook {playbook_id}"));
    };
    if let Err(e) = self.service.create_play(&route, description).await {
      error!(error = %e, playbook = %route, "error adding new play");
      return Notice::error(format!("Failed to add play: {e}"));
    }
    let reloaded = self.reload(session).await;
    if reloaded.is_error() {
      return reloaded;
    }
    Notice::info("Play added successfully!")
  }

  /// Replaces any running window; the old one is cancelled on drop.
  fn open_polling(&mut self, scope: LogScope) {
    self.polling = Some(PollingWindow::open(
      Arc::clone(&self.service),
      scope,
      self.poll_interval,
      self.poll_window,
    ));
  }
}
