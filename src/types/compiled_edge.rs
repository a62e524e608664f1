//! A directed edge between two compiled nodes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A directed edge between two compiled nodes.
///
/// `edge_id` is regenerated on every compile and is not stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledEdge {
  pub workflow_id: Uuid,
  pub edge_id: Uuid,
  pub source_node_id: String,
  pub target_node_id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_port: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub target_port: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub label: Option<String>,
}

impl CompiledEdge {
  /// True when this edge leaves through `port`; an empty port matches any edge.
  pub fn matches_port(&self, port: Option<&str>) -> bool {
    match port {
      None | Some("") => true,
      Some(p) => self.source_port.as_deref() == Some(p),
    }
  }
}
