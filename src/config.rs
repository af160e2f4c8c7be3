//! Runtime configuration: service location, timeouts, polling window, root policy.
//!
//! Values come from defaults, then command-line flags, then environment
//! variables; a variable that is set wins over the flag.

use crate::path_resolver::RootPolicy;
use std::time::Duration;
use thiserror::Error;

pub const ENV_SERVICE_URL: &str = "PLAYBOOK_SERVICE_URL";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "PLAYBOOK_REQUEST_TIMEOUT_SECS";
pub const ENV_POLL_INTERVAL_SECS: &str = "PLAYBOOK_POLL_INTERVAL_SECS";
pub const ENV_POLL_WINDOW_SECS: &str = "PLAYBOOK_POLL_WINDOW_SECS";
pub const ENV_INCLUDE_ISOLATED: &str = "PLAYBOOK_INCLUDE_ISOLATED";

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_POLL_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("{var} must be a whole number of seconds, got {value:?}")]
  InvalidSeconds { var: &'static str, value: String },
  #[error("{var} must be greater than zero")]
  Zero { var: &'static str },
  #[error("{var} must be true or false, got {value:?}")]
  InvalidFlag { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
  /// Base url of the playbook service.
  pub service_url: String,
  pub request_timeout: Duration,
  /// Delay between log fetches while a polling window is open.
  pub poll_interval: Duration,
  /// How long a polling window stays open after an execution.
  pub poll_window: Duration,
  pub root_policy: RootPolicy,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      service_url: DEFAULT_SERVICE_URL.to_string(),
      request_timeout: DEFAULT_REQUEST_TIMEOUT,
      poll_interval: DEFAULT_POLL_INTERVAL,
      poll_window: DEFAULT_POLL_WINDOW,
      root_policy: RootPolicy::SourcesOnly,
    }
  }
}

impl Config {
  /// Applies the process environment on top of `self`.
  pub fn with_env(self) -> Result<Self, ConfigError> {
    self.with_overrides(|var| std::env::var(var).ok())
  }

  /// Applies overrides looked up by variable name on top of `self`.
  pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    if let Some(url) = lookup(ENV_SERVICE_URL) {
      self.service_url = url;
    }
    if let Some(v) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
      self.request_timeout = parse_seconds(ENV_REQUEST_TIMEOUT_SECS, &v)?;
    }
    if let Some(v) = lookup(ENV_POLL_INTERVAL_SECS) {
      self.poll_interval = parse_seconds(ENV_POLL_INTERVAL_SECS, &v)?;
    }
    if let Some(v) = lookup(ENV_POLL_WINDOW_SECS) {
      self.poll_window = parse_seconds(ENV_POLL_WINDOW_SECS, &v)?;
    }
    if let Some(v) = lookup(ENV_INCLUDE_ISOLATED) {
      self.root_policy = if parse_flag(ENV_INCLUDE_ISOLATED, &v)? {
        RootPolicy::IncludeIsolated
      } else {
        RootPolicy::SourcesOnly
      };
    }
    Ok(self)
  }
}

/// Parses a strictly positive number of seconds.
pub(crate) fn parse_seconds(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
  let secs: u64 = value
    .trim()
    .parse()
    .map_err(|_| ConfigError::InvalidSeconds {
      var,
      value: value.to_string(),
    })?;
  if secs == 0 {
    return Err(ConfigError::Zero { var });
  }
  Ok(Duration::from_secs(secs))
}

pub(crate) fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
  match value.trim().to_ascii_lowercase().as_str() {
    "1" | "true" | "yes" => Ok(true),
    "0" | "false" | "no" => Ok(false),
    _ => Err(ConfigError::InvalidFlag {
      var,
      value: value.to_string(),
    }),
  }
}
