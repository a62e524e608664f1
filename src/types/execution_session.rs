//! Resumable execution session: the interpreter's per-session state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;

use super::{NodeResult, StateMap};

/// Lifecycle of a session. `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionStatus {
  #[default]
  Running,
  AwaitingInput,
  Completed,
  Failed,
}

impl SessionStatus {
  pub fn is_terminal(self) -> bool {
    matches!(self, Self::Completed | Self::Failed)
  }
}

/// One executed step, appended to the session history and never changed after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
  pub node_id: String,
  pub node_kind: String,
  pub executed_at: DateTime<Utc>,
  pub success: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error_message: Option<String>,
  #[serde(default)]
  pub output: StateMap,
}

impl HistoryEntry {
  pub fn from_result(node_id: &str, node_kind: &str, result: &NodeResult) -> Self {
    Self {
      node_id: node_id.to_string(),
      node_kind: node_kind.to_string(),
      executed_at: Utc::now(),
      success: result.success,
      error_message: result.error_message.clone(),
      output: result.output.clone(),
    }
  }
}

/// Resumable execution session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionSession {
  pub session_id: String,
  pub workflow_id: Uuid,
  pub user_id: String,
  pub current_node_id: String,
  #[serde(default)]
  pub status: SessionStatus,
  #[serde(default)]
  pub state_variables: StateMap,
  #[serde(default)]
  pub execution_history: Vec<HistoryEntry>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_input: Option<Value>,
  /// Prompt of the question the session is paused at.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub pending_prompt: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl ExecutionSession {
  /// Fresh session positioned at `start_node_id` with a generated id.
  pub fn new(
    workflow_id: Uuid,
    user_id: impl Into<String>,
    start_node_id: impl Into<String>,
    initial_state: StateMap,
  ) -> Self {
    let now = Utc::now();
    Self {
      session_id: Uuid::new_v4().to_string(),
      workflow_id,
      user_id: user_id.into(),
      current_node_id: start_node_id.into(),
      status: SessionStatus::Running,
      state_variables: initial_state,
      execution_history: Vec::new(),
      user_input: None,
      pending_prompt: None,
      created_at: now,
      updated_at: now,
    }
  }

  /// Merges updates into the state; later values win.
  #[instrument(level = "trace", skip(self, updates))]
  pub fn apply_updates(&mut self, updates: &StateMap) {
    for (k, v) in updates {
      self.state_variables.insert(k.clone(), v.clone());
    }
  }

  pub fn record(&mut self, entry: HistoryEntry) {
    self.execution_history.push(entry);
    self.updated_at = Utc::now();
  }

  /// Output of the most recently executed node, empty before the first step.
  pub fn last_output(&self) -> StateMap {
    self
      .execution_history
      .last()
      .map(|h| h.output.clone())
      .unwrap_or_default()
  }
}
