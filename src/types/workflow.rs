//! Stored workflow records: definition, versions and audit entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{CompiledEdge, CompiledNode};

/// A stored workflow with its graph source and compiled form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
  pub id: Uuid,
  pub name: String,
  #[serde(default)]
  pub description: String,
  pub graph_source: String,
  pub nodes: Vec<CompiledNode>,
  pub edges: Vec<CompiledEdge>,
  #[serde(default)]
  pub is_published: bool,
  pub created_by: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input for creating a workflow; `id` is generated when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkflow {
  #[serde(default)]
  pub id: Option<Uuid>,
  pub name: String,
  #[serde(default)]
  pub description: String,
  pub graph_source: String,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowUpdate {
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub graph_source: Option<String>,
}

/// Published snapshot of a workflow's graph source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowVersion {
  pub id: Uuid,
  pub workflow_id: Uuid,
  pub version_number: String,
  pub graph_snapshot: String,
  #[serde(default)]
  pub change_notes: String,
  pub is_active: bool,
  pub created_by: String,
  pub created_at: DateTime<Utc>,
}

/// Append-only audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
  pub workflow_id: Uuid,
  pub action: String,
  pub timestamp: DateTime<Utc>,
  pub user_id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub session_id: Option<String>,
  #[serde(default)]
  pub details: Value,
}

impl AuditEntry {
  pub fn new(workflow_id: Uuid, action: impl Into<String>, user_id: impl Into<String>) -> Self {
    Self {
      workflow_id,
      action: action.into(),
      timestamp: Utc::now(),
      user_id: user_id.into(),
      session_id: None,
      details: Value::Null,
    }
  }

  pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
    self.session_id = Some(session_id.into());
    self
  }

  pub fn with_details(mut self, details: Value) -> Self {
    self.details = details;
    self
  }
}
