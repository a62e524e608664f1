//! Condition executor: picks the first branch whose expression holds.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{NodeExecutor, StepInput};
use crate::condition::evaluate;
use crate::error::{ConfigError, ExecutorError};
use crate::types::{Connection, NodeConfig, NodeResult, StateMap};

pub(crate) const NO_MATCH: &str = "No condition matched and no default branch defined.";

/// One configured branch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
  #[serde(default)]
  pub condition: String,
  #[serde(default)]
  pub port: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub label: Option<String>,
  #[serde(default)]
  pub is_default: bool,
  /// Jump target; set for branches derived from connections.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub target_node_id: Option<String>,
}

impl Branch {
  /// A connection's label is both its condition and its port; an empty,
  /// `else` or `default` label marks the default branch.
  pub fn from_connection(connection: &Connection) -> Self {
    let label = connection.port_label.clone().unwrap_or_default();
    let trimmed = label.trim();
    let is_default = trimmed.is_empty()
      || trimmed.eq_ignore_ascii_case("else")
      || trimmed.eq_ignore_ascii_case("default");
    Self {
      condition: label.clone(),
      port: connection
        .source_port
        .clone()
        .unwrap_or_else(|| label.clone()),
      label: Some(label),
      is_default,
      target_node_id: Some(connection.target_node_id.clone()),
    }
  }
}

/// Configured `branches`, or branches derived from the node's `to` connections.
pub(crate) fn branches(config: &NodeConfig) -> Result<Vec<Branch>, ConfigError> {
  let parse_err = |key: &str, e: serde_json::Error| ConfigError::Invalid {
    key: key.to_string(),
    reason: e.to_string(),
  };
  if let Some(list) = config.array("branches")? {
    return serde_json::from_value(Value::Array(list.clone())).map_err(|e| parse_err("branches", e));
  }
  let connections: Vec<Connection> = match config.array("to")? {
    Some(list) => {
      serde_json::from_value(Value::Array(list.clone())).map_err(|e| parse_err("to", e))?
    }
    None => Vec::new(),
  };
  Ok(connections.iter().map(Branch::from_connection).collect())
}

fn select(result: NodeResult, branch: &Branch) -> NodeResult {
  let result = result.with_next_port(branch.port.clone());
  match &branch.target_node_id {
    Some(target) => result.with_next_node(target.clone()),
    None => result,
  }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionNode;

#[async_trait]
impl NodeExecutor for ConditionNode {
  fn family(&self) -> &'static str {
    "Condition"
  }

  async fn run(&self, input: StepInput<'_>) -> Result<NodeResult, ExecutorError> {
    let branches = branches(input.config)?;
    for branch in &branches {
      if evaluate(&branch.condition, input.state)? {
        debug!(
          node_id = %input.node_id,
          condition = %branch.condition,
          port = %branch.port,
          "branch matched"
        );
        let mut output = StateMap::new();
        output.insert(
          "evaluatedCondition".to_string(),
          Value::String(branch.condition.clone()),
        );
        output.insert(
          "selectedBranch".to_string(),
          Value::String(branch.label.clone().unwrap_or_else(|| branch.port.clone())),
        );
        output.insert("result".to_string(), Value::Bool(true));
        return Ok(select(NodeResult::success(output), branch));
      }
    }
    match branches.iter().find(|b| b.is_default) {
      Some(default) => {
        debug!(node_id = %input.node_id, port = %default.port, "default branch");
        let mut output = StateMap::new();
        output.insert("selectedBranch".to_string(), Value::String("default".to_string()));
        output.insert("result".to_string(), Value::Bool(false));
        Ok(select(NodeResult::success(output), default))
      }
      None => Ok(NodeResult::failure(NO_MATCH)),
    }
  }
}
