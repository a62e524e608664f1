//! Storage-ready projection of one graph node.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::NodeConfig;
use crate::error::ConfigError;

/// Returns true if the kind tag names a start node (`StartNode` or any tag containing `Start`).
pub fn kind_is_start(kind: &str) -> bool {
  kind == "StartNode" || kind.contains("Start")
}

/// Returns true if the kind tag names an end node (`EndNode` or any tag containing `End`).
pub fn kind_is_end(kind: &str) -> bool {
  kind == "EndNode" || kind.contains("End")
}

/// Storage-ready projection of one graph node.
///
/// `config_payload` is the full source node serialized as JSON, so kind-specific
/// fields not modeled here stay recoverable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledNode {
  pub workflow_id: Uuid,
  pub node_id: String,
  pub node_kind: String,
  pub label: String,
  pub position_x: f64,
  pub position_y: f64,
  pub config_payload: String,
}

impl CompiledNode {
  pub fn is_start(&self) -> bool {
    kind_is_start(&self.node_kind)
  }

  pub fn is_end(&self) -> bool {
    kind_is_end(&self.node_kind)
  }

  /// Parses `config_payload` into the per-step configuration view.
  pub fn config(&self) -> Result<NodeConfig, ConfigError> {
    if self.config_payload.trim().is_empty() {
      return Ok(NodeConfig::default());
    }
    let value: Value =
      serde_json::from_str(&self.config_payload).map_err(|e| ConfigError::Invalid {
        key: "configPayload".to_string(),
        reason: e.to_string(),
      })?;
    NodeConfig::from_value(value)
  }
}
