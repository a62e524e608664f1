//! Execution entry point shapes consumed by a transport layer.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{ExecutionSession, HistoryEntry, SessionStatus, StateMap};

/// Request to start or resume a workflow execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
  pub workflow_id: Uuid,
  /// Absent on the first call; the id returned earlier when resuming.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub session_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub initial_state: Option<StateMap>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_input: Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_id: Option<String>,
}

impl ExecuteRequest {
  pub fn start(workflow_id: Uuid) -> Self {
    Self {
      workflow_id,
      ..Self::default()
    }
  }

  pub fn resume(workflow_id: Uuid, session_id: impl Into<String>, input: Value) -> Self {
    Self {
      workflow_id,
      session_id: Some(session_id.into()),
      user_input: Some(input),
      ..Self::default()
    }
  }

  pub fn with_state(mut self, state: StateMap) -> Self {
    self.initial_state = Some(state);
    self
  }

  pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
    self.user_id = Some(user_id.into());
    self
  }
}

/// Outcome of one execution call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteResponse {
  pub session_id: String,
  pub status: SessionStatus,
  pub success: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error_message: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  pub requires_user_input: bool,
  pub is_complete: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub current_node_id: Option<String>,
  pub state: StateMap,
  pub output: StateMap,
  pub execution_history: Vec<HistoryEntry>,
}

impl ExecuteResponse {
  /// Snapshot of `session` after a call; `message` and `error` describe the last step.
  pub fn from_session(
    session: &ExecutionSession,
    message: Option<String>,
    error: Option<String>,
  ) -> Self {
    let status = session.status;
    Self {
      session_id: session.session_id.clone(),
      status,
      success: status != SessionStatus::Failed && error.is_none(),
      error_message: error,
      message,
      requires_user_input: status == SessionStatus::AwaitingInput,
      is_complete: status == SessionStatus::Completed,
      current_node_id: Some(session.current_node_id.clone()),
      state: session.state_variables.clone(),
      output: session.last_output(),
      execution_history: session.execution_history.clone(),
    }
  }

  /// Failure before any session exists (e.g. unknown workflow or session id).
  pub fn rejected(session_id: Option<String>, error: impl Into<String>) -> Self {
    Self {
      session_id: session_id.unwrap_or_default(),
      status: SessionStatus::Failed,
      success: false,
      error_message: Some(error.into()),
      message: None,
      requires_user_input: false,
      is_complete: false,
      current_node_id: None,
      state: StateMap::new(),
      output: StateMap::new(),
      execution_history: Vec::new(),
    }
  }
}
