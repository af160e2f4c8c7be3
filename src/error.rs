//! Errors raised when talking to the playbook service.

use thiserror::Error;

/// Failure of one request to the playbook service.
///
/// Callers report it to the user and carry on; nothing is retried and no
/// local state is rolled back.
#[derive(Debug, Error)]
pub enum ServiceError {
  #[error("invalid service url {url:?}: {reason}")]
  InvalidUrl { url: String, reason: String },
  #[error("could not build http client: {0}")]
  Client(#[source] reqwest::Error),
  #[error("request to {url} failed: {source}")]
  Transport {
    url: String,
    #[source]
    source: reqwest::Error,
  },
  #[error("{url} returned {status}: {body}")]
  Status { url: String, status: u16, body: String },
  #[error("could not decode response from {url}: {source}")]
  Decode {
    url: String,
    #[source]
    source: serde_json::Error,
  },
}

impl ServiceError {
  /// True for failures where the service was never reached or timed out.
  pub fn is_transport(&self) -> bool {
    matches!(self, ServiceError::Transport { .. })
  }
}
