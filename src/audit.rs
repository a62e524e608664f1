//! Append-only audit sinks.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::AuditEntry;

pub const ACTION_CREATED: &str = "Created";
pub const ACTION_UPDATED: &str = "Updated";
pub const ACTION_DELETED: &str = "Deleted";
pub const ACTION_PUBLISHED: &str = "Published";
pub const ACTION_VERSION_ACTIVATED: &str = "VersionActivated";
pub const ACTION_EXECUTED: &str = "Executed";
pub const ACTION_EXECUTION_FAILED: &str = "ExecutionFailed";

#[async_trait]
pub trait AuditSink: Send + Sync {
  async fn record(&self, entry: AuditEntry) -> Result<(), StoreError>;
}

/// Collects entries in memory.
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
  entries: RwLock<Vec<AuditEntry>>,
}

impl InMemoryAuditSink {
  pub fn new() -> Self {
    Self::default()
  }

  pub async fn entries(&self) -> Vec<AuditEntry> {
    self.entries.read().await.clone()
  }

  pub async fn for_workflow(&self, workflow_id: Uuid) -> Vec<AuditEntry> {
    self
      .entries
      .read()
      .await
      .iter()
      .filter(|e| e.workflow_id == workflow_id)
      .cloned()
      .collect()
  }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
  async fn record(&self, entry: AuditEntry) -> Result<(), StoreError> {
    self.entries.write().await.push(entry);
    Ok(())
  }
}

/// Emits each entry as a structured `tracing` event on the `flowweave::audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
  async fn record(&self, entry: AuditEntry) -> Result<(), StoreError> {
    info!(
      target: "flowweave::audit",
      workflow_id = %entry.workflow_id,
      action = %entry.action,
      user_id = %entry.user_id,
      session_id = entry.session_id.as_deref().unwrap_or(""),
      details = %entry.details,
      "audit"
    );
    Ok(())
  }
}
