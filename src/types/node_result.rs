//! Result of executing a single workflow node.

use serde::{Deserialize, Serialize};

use super::StateMap;

/// Result of executing a single workflow node.
///
/// The orchestrator reads, in order: `success`, `requires_user_input`,
/// `is_complete`, then `next_node_id` or `next_port` to pick the next node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeResult {
  pub success: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error_message: Option<String>,
  #[serde(default)]
  pub output: StateMap,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub next_node_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub next_port: Option<String>,
  #[serde(default)]
  pub requires_user_input: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  #[serde(default)]
  pub state_updates: StateMap,
  #[serde(default)]
  pub is_complete: bool,
}

impl NodeResult {
  pub fn success(output: StateMap) -> Self {
    Self {
      success: true,
      output,
      ..Self::default()
    }
  }

  pub fn failure(reason: impl Into<String>) -> Self {
    Self {
      success: false,
      error_message: Some(reason.into()),
      ..Self::default()
    }
  }

  /// Pause point: the caller must answer `prompt` before the node can finish.
  pub fn awaiting_input(prompt: impl Into<String>) -> Self {
    Self {
      success: true,
      requires_user_input: true,
      message: Some(prompt.into()),
      ..Self::default()
    }
  }

  pub fn with_message(mut self, message: impl Into<String>) -> Self {
    self.message = Some(message.into());
    self
  }

  pub fn with_state_updates(mut self, updates: StateMap) -> Self {
    self.state_updates = updates;
    self
  }

  pub fn with_next_port(mut self, port: impl Into<String>) -> Self {
    self.next_port = Some(port.into());
    self
  }

  pub fn with_next_node(mut self, node_id: impl Into<String>) -> Self {
    self.next_node_id = Some(node_id.into());
    self
  }
}
