//! In-memory [PlaybookService] used by unit tests.

use crate::error::ServiceError;
use crate::service::PlaybookService;
use crate::types::{ContextLogEntry, DockerLogEntry, LogScope, PathStep, Play, Playbook};
use crate::wire::{WireLibrary, WirePlay, WirePlaybook, serialize_playbooks};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

/// A recorded service call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
  FetchAll,
  CreatePlaybook { name: String, category: String },
  CreatePlay { playbook: String, description: String },
  Connect { playbook: String, parent: String, child: String },
  ExecuteAll(String),
  ExecuteSingle { playbook: String, play_id: String },
  ExecuteNodePath(Vec<PathStep>),
  DockerLogs(String),
  ContextLogs(LogScope),
}

/// Fake service backed by a wire library. Operations named in `failing`
/// return a 500 status error.
#[derive(Default)]
pub(crate) struct FakeService {
  library: Mutex<WireLibrary>,
  failing: Mutex<HashSet<&'static str>>,
  calls: Mutex<Vec<Call>>,
  pub docker_logs: Vec<DockerLogEntry>,
  pub context_logs: Vec<ContextLogEntry>,
  /// Delay before every log fetch answers.
  pub log_delay: Duration,
}

impl FakeService {
  pub fn with_playbooks(playbooks: &[Playbook]) -> Self {
    Self {
      library: Mutex::new(serialize_playbooks(playbooks)),
      docker_logs: vec![DockerLogEntry {
        command: "nmap -sV 10.0.0.1".to_string(),
        output: "22/tcp open ssh".to_string(),
      }],
      context_logs: vec![ContextLogEntry {
        play: "scan hosts".to_string(),
        command: "nmap".to_string(),
        result: json!({"hosts": 1}),
        context: json!("ok"),
      }],
      ..Self::default()
    }
  }

  pub fn fail(&self, op: &'static str) {
    self.failing.lock().unwrap().insert(op);
  }

  pub fn recover(&self, op: &'static str) {
    self.failing.lock().unwrap().remove(op);
  }

  pub fn calls(&self) -> Vec<Call> {
    self.calls.lock().unwrap().clone()
  }

  pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
    self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
  }

  fn record(&self, op: &'static str, call: Call) -> Result<(), ServiceError> {
    self.calls.lock().unwrap().push(call);
    if self.failing.lock().unwrap().contains(op) {
      return Err(ServiceError::Status {
        url: format!("fake://{op}"),
        status: 500,
        body: "boom".to_string(),
      });
    }
    Ok(())
  }
}

#[async_trait]
impl PlaybookService for FakeService {
  async fn fetch_all_playbooks(&self) -> Result<WireLibrary, ServiceError> {
    self.record("fetch_all", Call::FetchAll)?;
    Ok(self.library.lock().unwrap().clone())
  }

  async fn create_playbook(&self, name: &str, category: &str) -> Result<Value, ServiceError> {
    self.record(
      "create_playbook",
      Call::CreatePlaybook {
        name: name.to_string(),
        category: category.to_string(),
      },
    )?;
    let record = WirePlaybook {
      id: name.to_string(),
      name: name.to_string(),
      category: category.to_string(),
      ip: None,
      plays: Vec::new(),
    };
    self.library.lock().unwrap().insert(name.to_string(), record);
    Ok(json!({"id": name}))
  }

  async fn create_play(&self, playbook: &str, description: &str) -> Result<Value, ServiceError> {
    self.record(
      "create_play",
      Call::CreatePlay {
        playbook: playbook.to_string(),
        description: description.to_string(),
      },
    )?;
    let mut library = self.library.lock().unwrap();
    if let Some(record) = library.values_mut().find(|r| r.name == playbook) {
      let id = format!("{}-{}", playbook, record.plays.len());
      record
        .plays
        .push(WirePlay::from(&Play::new(id.as_str(), playbook, description)));
      return Ok(json!({"id": id}));
    }
    Ok(Value::Null)
  }

  async fn connect(
    &self,
    playbook: &str,
    parent_description: &str,
    child_description: &str,
  ) -> Result<(), ServiceError> {
    self.record(
      "connect",
      Call::Connect {
        playbook: playbook.to_string(),
        parent: parent_description.to_string(),
        child: child_description.to_string(),
      },
    )
  }

  async fn execute_all(&self, playbook: &str) -> Result<Value, ServiceError> {
    self.record("execute_all", Call::ExecuteAll(playbook.to_string()))?;
    Ok(json!({"status": "started"}))
  }

  async fn execute_single(&self, playbook: &str, play_id: &str) -> Result<Value, ServiceError> {
    self.record(
      "execute_single",
      Call::ExecuteSingle {
        playbook: playbook.to_string(),
        play_id: play_id.to_string(),
      },
    )?;
    Ok(json!({"status": "started"}))
  }

  async fn execute_node_path(&self, steps: &[PathStep]) -> Result<Value, ServiceError> {
    self.record("execute_node_path", Call::ExecuteNodePath(steps.to_vec()))?;
    Ok(json!({"status": "started"}))
  }

  async fn fetch_docker_logs(&self, playbook_id: &str) -> Result<Vec<DockerLogEntry>, ServiceError> {
    self.record("docker_logs", Call::DockerLogs(playbook_id.to_string()))?;
    Ok(self.docker_logs.clone())
  }

  async fn fetch_context_logs(&self, scope: &LogScope) -> Result<Vec<ContextLogEntry>, ServiceError> {
    self.record("context_logs", Call::ContextLogs(scope.clone()))?;
    if !self.log_delay.is_zero() {
      tokio::time::sleep(self.log_delay).await;
    }
    Ok(self.context_logs.clone())
  }
}

/// Two playbooks: `Nmap_test` (n1 -> n2 declared from both ends, n2 -> n3)
/// and `Exploit` (x1, unconnected).
pub(crate) fn sample_playbooks() -> Vec<Playbook> {
  vec![
    Playbook::new("pb1", "Nmap_test", "recon").with_plays(vec![
      Play::new("n1", "Nmap_test", "scan hosts").with_forward_links(["n2"]),
      Play::new("n2", "Nmap_test", "scan ports")
        .with_backward_links(["n1"])
        .with_forward_links(["n3"]),
      Play::new("n3", "Nmap_test", "report").completed(true),
    ]),
    Playbook::new("pb2", "Exploit", "attack").with_plays(vec![Play::new("x1", "Exploit", "run exploit")]),
  ]
}
