//! Serialized graph source: a flat map of node id to node definition.
//!
//! Node definitions are a closed set of kinds (`trigger`, `agent`, `action`,
//! `condition`, `note`) plus [`NodeDefinition::Custom`] for every other tag,
//! which is how the executor kinds (`MessageNode`, `QuestionNode`, ...) travel.
//! Fields a kind does not model are retained in [`NodeCommon::extra`] so the
//! original payload can be reproduced by [`NodeDefinition::to_value`].

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::instrument;

use crate::error::CompilationError;

/// Outgoing connection from one node to another.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
  /// Target node id.
  #[serde(rename = "id", alias = "targetNodeId", default)]
  pub target_node_id: String,
  /// Edge annotation; doubles as a branch condition and port for condition nodes.
  #[serde(
    rename = "prompt",
    alias = "portLabel",
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub port_label: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_port: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub target_port: Option<String>,
}

impl Connection {
  pub fn to(target: impl Into<String>) -> Self {
    Self {
      target_node_id: target.into(),
      ..Self::default()
    }
  }

  pub fn labeled(target: impl Into<String>, label: impl Into<String>) -> Self {
    Self {
      target_node_id: target.into(),
      port_label: Some(label.into()),
      ..Self::default()
    }
  }
}

/// Explicit canvas coordinates (only note nodes carry them).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
  #[serde(default)]
  pub x: f64,
  #[serde(default)]
  pub y: f64,
}

/// Skill metadata attached to an agent node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skill {
  #[serde(default)]
  pub id: String,
  #[serde(default)]
  pub name: String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub icon: String,
}

/// Fields shared by every node kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeCommon {
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub label: String,
  #[serde(default)]
  pub to: Vec<Connection>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub prompt: Option<String>,
  /// Every field the kind does not model, kept verbatim.
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerNode {
  #[serde(flatten)]
  pub common: NodeCommon,
  #[serde(default)]
  pub trigger_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentNode {
  #[serde(flatten)]
  pub common: NodeCommon,
  #[serde(default)]
  pub skills: BTreeMap<String, Skill>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionNode {
  #[serde(flatten)]
  pub common: NodeCommon,
  #[serde(default)]
  pub action_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteNode {
  #[serde(flatten)]
  pub common: NodeCommon,
  #[serde(default)]
  pub markdown: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub position: Option<Position>,
}

/// Any node whose `type` tag is not one of the built-in kinds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomNode {
  pub kind: String,
  pub common: NodeCommon,
}

/// One entry of the graph source.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeDefinition {
  Trigger(TriggerNode),
  Agent(AgentNode),
  Action(ActionNode),
  Condition(NodeCommon),
  Note(NoteNode),
  Custom(CustomNode),
}

fn parse_payload<T: DeserializeOwned>(
  node_id: &str,
  payload: Map<String, Value>,
) -> Result<T, CompilationError> {
  serde_json::from_value(Value::Object(payload)).map_err(|e| CompilationError::InvalidNode {
    node_id: node_id.to_string(),
    reason: e.to_string(),
  })
}

impl NodeDefinition {
  /// Parses one node from its JSON object, dispatching on the `type` tag.
  pub fn from_value(node_id: &str, value: Value) -> Result<Self, CompilationError> {
    let Value::Object(mut payload) = value else {
      return Err(CompilationError::InvalidNode {
        node_id: node_id.to_string(),
        reason: "node definition must be a JSON object".to_string(),
      });
    };
    let kind = match payload.remove("type") {
      None | Some(Value::Null) => String::new(),
      Some(Value::String(s)) => s,
      Some(other) => {
        return Err(CompilationError::InvalidNode {
          node_id: node_id.to_string(),
          reason: format!("'type' must be a string, found {other}"),
        });
      }
    };
    Ok(match kind.as_str() {
      "trigger" => Self::Trigger(parse_payload(node_id, payload)?),
      "agent" => Self::Agent(parse_payload(node_id, payload)?),
      "action" => Self::Action(parse_payload(node_id, payload)?),
      "condition" => Self::Condition(parse_payload(node_id, payload)?),
      "note" => Self::Note(parse_payload(node_id, payload)?),
      _ => Self::Custom(CustomNode {
        kind: kind.clone(),
        common: parse_payload(node_id, payload)?,
      }),
    })
  }

  /// The `type` tag this node was declared with.
  pub fn kind(&self) -> &str {
    match self {
      Self::Trigger(_) => "trigger",
      Self::Agent(_) => "agent",
      Self::Action(_) => "action",
      Self::Condition(_) => "condition",
      Self::Note(_) => "note",
      Self::Custom(c) => &c.kind,
    }
  }

  pub fn common(&self) -> &NodeCommon {
    match self {
      Self::Trigger(n) => &n.common,
      Self::Agent(n) => &n.common,
      Self::Action(n) => &n.common,
      Self::Condition(c) => c,
      Self::Note(n) => &n.common,
      Self::Custom(n) => &n.common,
    }
  }

  pub fn connections(&self) -> &[Connection] {
    &self.common().to
  }

  pub fn position(&self) -> Option<Position> {
    match self {
      Self::Note(n) => n.position,
      _ => None,
    }
  }

  /// Serializes the node back to its source shape, `type` tag first.
  pub fn to_value(&self) -> Value {
    let body = match self {
      Self::Trigger(n) => serde_json::to_value(n),
      Self::Agent(n) => serde_json::to_value(n),
      Self::Action(n) => serde_json::to_value(n),
      Self::Condition(c) => serde_json::to_value(c),
      Self::Note(n) => serde_json::to_value(n),
      Self::Custom(n) => serde_json::to_value(&n.common),
    };
    let mut out = Map::new();
    out.insert("type".to_string(), Value::String(self.kind().to_string()));
    if let Ok(Value::Object(fields)) = body {
      out.extend(fields);
    }
    Value::Object(out)
  }
}

/// Parsed graph source, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphDefinition {
  pub nodes: Vec<(String, NodeDefinition)>,
}

impl GraphDefinition {
  /// Parses a graph source document (`{ "<node id>": { "type": ..., ... }, ... }`).
  #[instrument(level = "trace", skip(json))]
  pub fn parse(json: &str) -> Result<Self, CompilationError> {
    let root: Value = serde_json::from_str(json)?;
    let Value::Object(entries) = root else {
      return Err(CompilationError::NotANodeMap);
    };
    let nodes = entries
      .into_iter()
      .map(|(id, value)| {
        let def = NodeDefinition::from_value(&id, value)?;
        Ok((id, def))
      })
      .collect::<Result<Vec<_>, CompilationError>>()?;
    Ok(Self { nodes })
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  /// Serializes the graph back to its source shape.
  pub fn to_value(&self) -> Value {
    Value::Object(
      self
        .nodes
        .iter()
        .map(|(id, def)| (id.clone(), def.to_value()))
        .collect(),
    )
  }
}
