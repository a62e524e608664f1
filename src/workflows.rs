//! Workflow lifecycle: create, update, delete, validate, publish and version activation.
//!
//! Every mutation recompiles the graph source wholesale and leaves an audit entry.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::audit::{
  ACTION_CREATED, ACTION_DELETED, ACTION_PUBLISHED, ACTION_UPDATED, ACTION_VERSION_ACTIVATED,
  AuditSink,
};
use crate::compiler::compile_graph;
use crate::error::{StoreError, WorkflowError};
use crate::types::{
  AuditEntry, NewWorkflow, ValidationResult, Workflow, WorkflowUpdate, WorkflowVersion,
};
use crate::validator::validate;
use crate::workflow_store::WorkflowStore;

pub struct WorkflowService {
  store: Arc<dyn WorkflowStore>,
  audit: Arc<dyn AuditSink>,
}

impl WorkflowService {
  pub fn new(store: Arc<dyn WorkflowStore>, audit: Arc<dyn AuditSink>) -> Self {
    Self { store, audit }
  }

  pub fn store(&self) -> &Arc<dyn WorkflowStore> {
    &self.store
  }

  async fn record(&self, entry: AuditEntry) {
    if let Err(e) = self.audit.record(entry).await {
      warn!(error = %e, "failed to record audit entry");
    }
  }

  async fn require(&self, id: Uuid) -> Result<Workflow, WorkflowError> {
    self
      .store
      .get_by_id(id)
      .await?
      .ok_or(WorkflowError::Store(StoreError::WorkflowNotFound(id)))
  }

  pub async fn get(&self, id: Uuid) -> Result<Option<Workflow>, WorkflowError> {
    Ok(self.store.get_by_id(id).await?)
  }

  pub async fn list(&self) -> Result<Vec<Workflow>, WorkflowError> {
    Ok(self.store.list().await?)
  }

  /// Compiles and stores a new workflow. Nothing is stored when compilation fails.
  #[instrument(level = "trace", skip(self, new), fields(name = %new.name))]
  pub async fn create(&self, new: NewWorkflow, user_id: &str) -> Result<Workflow, WorkflowError> {
    let id = new.id.unwrap_or_else(Uuid::new_v4);
    let compiled = compile_graph(&new.graph_source, id)?;
    let now = Utc::now();
    let workflow = Workflow {
      id,
      name: new.name,
      description: new.description,
      graph_source: new.graph_source,
      nodes: compiled.nodes,
      edges: compiled.edges,
      is_published: false,
      created_by: user_id.to_string(),
      created_at: now,
      updated_at: now,
    };
    let workflow = self.store.create(workflow).await?;
    info!(workflow_id = %id, nodes = workflow.nodes.len(), "workflow created");
    self
      .record(
        AuditEntry::new(id, ACTION_CREATED, user_id).with_details(json!({ "name": workflow.name })),
      )
      .await;
    Ok(workflow)
  }

  /// Applies a partial update; a new graph source replaces all compiled nodes and edges.
  #[instrument(level = "trace", skip(self, update))]
  pub async fn update(
    &self,
    id: Uuid,
    update: WorkflowUpdate,
    user_id: &str,
  ) -> Result<Workflow, WorkflowError> {
    let mut workflow = self.require(id).await?;
    if let Some(source) = update.graph_source {
      let compiled = compile_graph(&source, id)?;
      workflow.graph_source = source;
      workflow.nodes = compiled.nodes;
      workflow.edges = compiled.edges;
    }
    if let Some(name) = update.name {
      workflow.name = name;
    }
    if let Some(description) = update.description {
      workflow.description = description;
    }
    workflow.updated_at = Utc::now();
    let workflow = self.store.update(workflow).await?;
    info!(workflow_id = %id, "workflow updated");
    self
      .record(
        AuditEntry::new(id, ACTION_UPDATED, user_id).with_details(json!({ "name": workflow.name })),
      )
      .await;
    Ok(workflow)
  }

  /// Returns false when the workflow did not exist.
  pub async fn delete(&self, id: Uuid, user_id: &str) -> Result<bool, WorkflowError> {
    let deleted = self.store.delete(id).await?;
    if deleted {
      info!(workflow_id = %id, "workflow deleted");
      self.record(AuditEntry::new(id, ACTION_DELETED, user_id)).await;
    }
    Ok(deleted)
  }

  pub async fn validate(&self, id: Uuid) -> Result<ValidationResult, WorkflowError> {
    let workflow = self.require(id).await?;
    Ok(validate(&workflow.nodes, &workflow.edges))
  }

  /// Snapshots the current graph source as the active version and marks the workflow published.
  ///
  /// Refused when validation reports errors; warnings do not block publishing.
  #[instrument(level = "trace", skip(self, change_notes))]
  pub async fn publish(
    &self,
    id: Uuid,
    version_number: &str,
    change_notes: &str,
    user_id: &str,
  ) -> Result<WorkflowVersion, WorkflowError> {
    let mut workflow = self.require(id).await?;
    let validation = validate(&workflow.nodes, &workflow.edges);
    if !validation.is_valid {
      return Err(WorkflowError::ValidationFailed {
        codes: validation.error_codes(),
      });
    }
    let version = WorkflowVersion {
      id: Uuid::new_v4(),
      workflow_id: id,
      version_number: version_number.to_string(),
      graph_snapshot: workflow.graph_source.clone(),
      change_notes: change_notes.to_string(),
      is_active: true,
      created_by: user_id.to_string(),
      created_at: Utc::now(),
    };
    let previous = workflow.clone();
    workflow.is_published = true;
    workflow.updated_at = Utc::now();
    self.store.update(workflow).await?;
    let version = match self.store.create_version(version).await {
      Ok(version) => version,
      Err(e) => {
        if let Err(rollback) = self.store.update(previous).await {
          warn!(
            workflow_id = %id,
            error = %rollback,
            "failed to restore workflow after publish error"
          );
        }
        return Err(e.into());
      }
    };
    info!(workflow_id = %id, version = version_number, "workflow published");
    self
      .record(
        AuditEntry::new(id, ACTION_PUBLISHED, user_id)
          .with_details(json!({ "versionNumber": version_number, "changeNotes": change_notes })),
      )
      .await;
    Ok(version)
  }

  pub async fn versions(&self, id: Uuid) -> Result<Vec<WorkflowVersion>, WorkflowError> {
    Ok(self.store.list_versions(id).await?)
  }

  pub async fn active_version(&self, id: Uuid) -> Result<Option<WorkflowVersion>, WorkflowError> {
    Ok(self.store.active_version(id).await?)
  }

  pub async fn activate_version(
    &self,
    id: Uuid,
    version_number: &str,
    user_id: &str,
  ) -> Result<WorkflowVersion, WorkflowError> {
    let version = self.store.activate_version(id, version_number).await?;
    info!(workflow_id = %id, version = version_number, "version activated");
    self
      .record(
        AuditEntry::new(id, ACTION_VERSION_ACTIVATED, user_id)
          .with_details(json!({ "versionNumber": version_number })),
      )
      .await;
    Ok(version)
  }
}
