//! The remote playbook service: an async trait and its HTTP/JSON client.

use crate::config::Config;
use crate::error::ServiceError;
use crate::types::{ContextLogEntry, DockerLogEntry, LogScope, PathStep};
use crate::wire::WireLibrary;
use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// Operations of the remote playbook service.
///
/// `playbook` arguments of mutating operations are route keys
/// ([Playbook::route_key](crate::types::Playbook::route_key)); log operations
/// take playbook ids. Acknowledgement payloads are returned verbatim and only
/// success or failure is interpreted.
#[async_trait]
pub trait PlaybookService: Send + Sync {
  async fn fetch_all_playbooks(&self) -> Result<WireLibrary, ServiceError>;

  async fn create_playbook(&self, name: &str, category: &str) -> Result<Value, ServiceError>;

  /// Creates a play; the service appends it to the playbook.
  async fn create_play(&self, playbook: &str, description: &str) -> Result<Value, ServiceError>;

  /// Records `parent -> child`, both identified by description.
  async fn connect(
    &self,
    playbook: &str,
    parent_description: &str,
    child_description: &str,
  ) -> Result<(), ServiceError>;

  async fn execute_all(&self, playbook: &str) -> Result<Value, ServiceError>;

  async fn execute_single(&self, playbook: &str, play_id: &str) -> Result<Value, ServiceError>;

  async fn execute_node_path(&self, steps: &[PathStep]) -> Result<Value, ServiceError>;

  async fn fetch_docker_logs(&self, playbook_id: &str) -> Result<Vec<DockerLogEntry>, ServiceError>;

  async fn fetch_context_logs(&self, scope: &LogScope) -> Result<Vec<ContextLogEntry>, ServiceError>;
}

#[derive(Debug, Serialize)]
struct CreatePlaybookRequest<'a> {
  name: &'a str,
  category: &'a str,
}

#[derive(Debug, Serialize)]
struct CreatePlayRequest<'a> {
  description: &'a str,
}

#[derive(Debug, Serialize)]
struct ConnectRequest<'a> {
  parent_description: &'a str,
  child_description: &'a str,
}

#[derive(Debug, Serialize)]
struct ExecuteSingleRequest<'a> {
  play_id: &'a str,
}

#[derive(Debug, Serialize)]
struct ExecuteNodePathRequest<'a> {
  #[serde(rename = "nodePath")]
  node_path: &'a [PathStep],
}

/// `{"logs": [...]}`; a missing or null array reads as empty.
#[derive(Debug, Deserialize)]
#[serde(bound = "T: Deserialize<'de>")]
struct LogsResponse<T> {
  logs: Option<Vec<T>>,
}

/// HTTP/JSON client for the playbook service.
#[derive(Debug, Clone)]
pub struct HttpPlaybookService {
  base_url: Url,
  client: Client,
}

impl HttpPlaybookService {
  pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
    let parsed = Url::parse(base_url).map_err(|e| ServiceError::InvalidUrl {
      url: base_url.to_string(),
      reason: e.to_string(),
    })?;
    if parsed.cannot_be_a_base() {
      return Err(ServiceError::InvalidUrl {
        url: base_url.to_string(),
        reason: "not a base url".to_string(),
      });
    }
    let client = Client::builder()
      .timeout(timeout)
      .build()
      .map_err(ServiceError::Client)?;
    Ok(Self {
      base_url: parsed,
      client,
    })
  }

  pub fn from_config(config: &Config) -> Result<Self, ServiceError> {
    Self::new(&config.service_url, config.request_timeout)
  }

  pub fn base_url(&self) -> &Url {
    &self.base_url
  }

  /// Base url with `segments` appended, each percent-encoded.
  pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ServiceError> {
    let mut url = self.base_url.clone();
    url
      .path_segments_mut()
      .map_err(|_| ServiceError::InvalidUrl {
        url: self.base_url.to_string(),
        reason: "not a base url".to_string(),
      })?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }

  /// Sends the request and returns the body of a 2xx response.
  async fn send(
    &self,
    method: Method,
    url: Url,
    body: Option<Value>,
  ) -> Result<(String, Vec<u8>), ServiceError> {
    let label = url.to_string();
    let mut request = self.client.request(method.clone(), url);
    if let Some(body) = body {
      request = request.json(&body);
    }
    let response = request.send().await.map_err(|source| ServiceError::Transport {
      url: label.clone(),
      source,
    })?;
    let status = response.status();
    let bytes = response
      .bytes()
      .await
      .map_err(|source| ServiceError::Transport {
        url: label.clone(),
        source,
      })?;
    debug!(%method, url = %label, status = status.as_u16(), "service response");
    if !status.is_success() {
      return Err(ServiceError::Status {
        url: label,
        status: status.as_u16(),
        body: String::from_utf8_lossy(&bytes).into_owned(),
      });
    }
    Ok((label, bytes.to_vec()))
  }

  async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ServiceError> {
    let url = self.endpoint(segments)?;
    let (label, bytes) = self.send(Method::GET, url, None).await?;
    serde_json::from_slice(&bytes).map_err(|source| ServiceError::Decode { url: label, source })
  }

  /// POSTs `body` and returns the acknowledgement: JSON when the body parses,
  /// the raw text otherwise, `null` when empty.
  async fn post_ack<B: Serialize>(
    &self,
    segments: &[&str],
    body: Option<&B>,
  ) -> Result<Value, ServiceError> {
    let url = self.endpoint(segments)?;
    let label = url.to_string();
    let body = body
      .map(serde_json::to_value)
      .transpose()
      .map_err(|source| ServiceError::Decode { url: label, source })?;
    let (_, bytes) = self.send(Method::POST, url, body).await?;
    Ok(ack_value(&bytes))
  }
}

/// Interprets an acknowledgement body.
pub(crate) fn ack_value(bytes: &[u8]) -> Value {
  if bytes.iter().all(u8::is_ascii_whitespace) {
    return Value::Null;
  }
  serde_json::from_slice(bytes)
    .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[async_trait]
impl PlaybookService for HttpPlaybookService {
  #[instrument(level = "debug", skip(self))]
  async fn fetch_all_playbooks(&self) -> Result<WireLibrary, ServiceError> {
    self.get_json(&["allplaybooks"]).await
  }

  #[instrument(level = "debug", skip(self))]
  async fn create_playbook(&self, name: &str, category: &str) -> Result<Value, ServiceError> {
    self
      .post_ack(&["playbook"], Some(&CreatePlaybookRequest { name, category }))
      .await
  }

  #[instrument(level = "debug", skip(self))]
  async fn create_play(&self, playbook: &str, description: &str) -> Result<Value, ServiceError> {
    self
      .post_ack(&["playbook", playbook, "play"], Some(&CreatePlayRequest { description }))
      .await
  }

  #[instrument(level = "debug", skip(self))]
  async fn connect(
    &self,
    playbook: &str,
    parent_description: &str,
    child_description: &str,
  ) -> Result<(), ServiceError> {
    let request = ConnectRequest {
      parent_description,
      child_description,
    };
    self
      .post_ack(&["playbook", playbook, "connect"], Some(&request))
      .await
      .map(|_| ())
  }

  #[instrument(level = "debug", skip(self))]
  async fn execute_all(&self, playbook: &str) -> Result<Value, ServiceError> {
    self
      .post_ack::<Value>(&["playbook", playbook, "execute_all"], None)
      .await
  }

  #[instrument(level = "debug", skip(self))]
  async fn execute_single(&self, playbook: &str, play_id: &str) -> Result<Value, ServiceError> {
    self
      .post_ack(&["playbook", playbook, "execute"], Some(&ExecuteSingleRequest { play_id }))
      .await
  }

  #[instrument(level = "debug", skip(self, steps), fields(steps = steps.len()))]
  async fn execute_node_path(&self, steps: &[PathStep]) -> Result<Value, ServiceError> {
    self
      .post_ack(&["playbook", "execute"], Some(&ExecuteNodePathRequest { node_path: steps }))
      .await
  }

  #[instrument(level = "debug", skip(self))]
  async fn fetch_docker_logs(&self, playbook_id: &str) -> Result<Vec<DockerLogEntry>, ServiceError> {
    let response: LogsResponse<DockerLogEntry> =
      self.get_json(&["playbook", playbook_id, "logs"]).await?;
    Ok(response.logs.unwrap_or_default())
  }

  #[instrument(level = "debug", skip(self))]
  async fn fetch_context_logs(&self, scope: &LogScope) -> Result<Vec<ContextLogEntry>, ServiceError> {
    let response: LogsResponse<ContextLogEntry> = match scope {
      LogScope::Playbook(id) => self.get_json(&["playbook", id.as_str(), "context_logs"]).await?,
      LogScope::Global => self.get_json(&["context_logs"]).await?,
    };
    Ok(response.logs.unwrap_or_default())
  }
}
