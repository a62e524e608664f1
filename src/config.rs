//! Engine configuration: step budget, HTTP timeout and default user.
//!
//! Values come from defaults, an optional JSON file and `FLOWWEAVE_*`
//! environment variables, in that order of increasing precedence.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::error::ConfigError;

pub const ENV_MAX_STEPS: &str = "FLOWWEAVE_MAX_STEPS";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "FLOWWEAVE_HTTP_TIMEOUT_SECS";
pub const ENV_DEFAULT_USER: &str = "FLOWWEAVE_DEFAULT_USER";

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
  /// Maximum node executions per execution call.
  pub max_steps: usize,
  /// Timeout applied to every outbound APICall request.
  pub http_timeout_secs: u64,
  /// User recorded on sessions and audit entries when the request names none.
  pub default_user_id: String,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      max_steps: 100,
      http_timeout_secs: 30,
      default_user_id: "anonymous".to_string(),
    }
  }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
  raw.trim().parse().map_err(|_| ConfigError::Invalid {
    key: key.to_string(),
    reason: format!("cannot parse '{raw}'"),
  })
}

impl EngineConfig {
  pub fn http_timeout(&self) -> Duration {
    Duration::from_secs(self.http_timeout_secs)
  }

  /// Reads a JSON config file; missing keys keep their defaults.
  #[instrument(level = "trace")]
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Invalid {
      key: path.display().to_string(),
      reason: e.to_string(),
    })?;
    let config: Self = serde_json::from_str(&text).map_err(|e| ConfigError::Invalid {
      key: path.display().to_string(),
      reason: e.to_string(),
    })?;
    config.checked()
  }

  /// Defaults overridden by `FLOWWEAVE_*` environment variables.
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::default().with_overrides(|key| std::env::var(key).ok())
  }

  /// Applies overrides from `lookup` (an environment-like key source).
  pub fn with_overrides(
    mut self,
    lookup: impl Fn(&str) -> Option<String>,
  ) -> Result<Self, ConfigError> {
    if let Some(raw) = lookup(ENV_MAX_STEPS) {
      self.max_steps = parse_env(ENV_MAX_STEPS, &raw)?;
    }
    if let Some(raw) = lookup(ENV_HTTP_TIMEOUT_SECS) {
      self.http_timeout_secs = parse_env(ENV_HTTP_TIMEOUT_SECS, &raw)?;
    }
    if let Some(raw) = lookup(ENV_DEFAULT_USER) {
      let user = raw.trim();
      if user.is_empty() {
        warn!(key = ENV_DEFAULT_USER, "ignoring empty default user");
      } else {
        self.default_user_id = user.to_string();
      }
    }
    self.checked()
  }

  fn checked(self) -> Result<Self, ConfigError> {
    if self.max_steps == 0 {
      return Err(ConfigError::Invalid {
        key: "maxSteps".to_string(),
        reason: "must be at least 1".to_string(),
      });
    }
    Ok(self)
  }
}
