//! Storage for workflows, their compiled graphs and published versions.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::{Workflow, WorkflowVersion};

#[async_trait]
pub trait WorkflowStore: Send + Sync {
  async fn get_by_id(&self, id: Uuid) -> Result<Option<Workflow>, StoreError>;

  /// All workflows, most recently updated first.
  async fn list(&self) -> Result<Vec<Workflow>, StoreError>;

  async fn create(&self, workflow: Workflow) -> Result<Workflow, StoreError>;

  /// Replaces a stored workflow wholesale (compiled nodes and edges included).
  async fn update(&self, workflow: Workflow) -> Result<Workflow, StoreError>;

  /// Removes the workflow and its versions. Returns false when it did not exist.
  async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

  /// Versions of a workflow, newest first.
  async fn list_versions(&self, workflow_id: Uuid) -> Result<Vec<WorkflowVersion>, StoreError>;

  /// Stores a new version; when it is active every other version is deactivated.
  async fn create_version(&self, version: WorkflowVersion) -> Result<WorkflowVersion, StoreError>;

  /// Makes `version_number` the only active version.
  async fn activate_version(
    &self,
    workflow_id: Uuid,
    version_number: &str,
  ) -> Result<WorkflowVersion, StoreError>;

  async fn active_version(&self, workflow_id: Uuid) -> Result<Option<WorkflowVersion>, StoreError>;
}

#[derive(Debug, Default)]
struct Tables {
  workflows: HashMap<Uuid, Workflow>,
  versions: HashMap<Uuid, Vec<WorkflowVersion>>,
}

/// Workflow store backed by in-process maps.
#[derive(Debug, Default)]
pub struct InMemoryWorkflowStore {
  tables: RwLock<Tables>,
}

impl InMemoryWorkflowStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl WorkflowStore for InMemoryWorkflowStore {
  async fn get_by_id(&self, id: Uuid) -> Result<Option<Workflow>, StoreError> {
    Ok(self.tables.read().await.workflows.get(&id).cloned())
  }

  async fn list(&self) -> Result<Vec<Workflow>, StoreError> {
    let mut all: Vec<Workflow> = self.tables.read().await.workflows.values().cloned().collect();
    all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    Ok(all)
  }

  async fn create(&self, workflow: Workflow) -> Result<Workflow, StoreError> {
    let mut tables = self.tables.write().await;
    if tables.workflows.contains_key(&workflow.id) {
      return Err(StoreError::WorkflowExists(workflow.id));
    }
    tables.workflows.insert(workflow.id, workflow.clone());
    Ok(workflow)
  }

  async fn update(&self, workflow: Workflow) -> Result<Workflow, StoreError> {
    let mut tables = self.tables.write().await;
    match tables.workflows.get_mut(&workflow.id) {
      Some(slot) => {
        *slot = workflow.clone();
        Ok(workflow)
      }
      None => Err(StoreError::WorkflowNotFound(workflow.id)),
    }
  }

  async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
    let mut tables = self.tables.write().await;
    tables.versions.remove(&id);
    Ok(tables.workflows.remove(&id).is_some())
  }

  async fn list_versions(&self, workflow_id: Uuid) -> Result<Vec<WorkflowVersion>, StoreError> {
    let tables = self.tables.read().await;
    let mut versions = tables.versions.get(&workflow_id).cloned().unwrap_or_default();
    versions.reverse();
    Ok(versions)
  }

  async fn create_version(&self, version: WorkflowVersion) -> Result<WorkflowVersion, StoreError> {
    let mut tables = self.tables.write().await;
    if !tables.workflows.contains_key(&version.workflow_id) {
      return Err(StoreError::WorkflowNotFound(version.workflow_id));
    }
    let versions = tables.versions.entry(version.workflow_id).or_default();
    if versions
      .iter()
      .any(|v| v.version_number == version.version_number)
    {
      return Err(StoreError::VersionExists {
        workflow_id: version.workflow_id,
        version: version.version_number,
      });
    }
    if version.is_active {
      for v in versions.iter_mut() {
        v.is_active = false;
      }
    }
    versions.push(version.clone());
    Ok(version)
  }

  async fn activate_version(
    &self,
    workflow_id: Uuid,
    version_number: &str,
  ) -> Result<WorkflowVersion, StoreError> {
    let mut tables = self.tables.write().await;
    let not_found = || StoreError::VersionNotFound {
      workflow_id,
      version: version_number.to_string(),
    };
    let versions = tables.versions.get_mut(&workflow_id).ok_or_else(not_found)?;
    if !versions.iter().any(|v| v.version_number == version_number) {
      return Err(not_found());
    }
    let mut activated = None;
    for v in versions.iter_mut() {
      v.is_active = v.version_number == version_number;
      if v.is_active {
        activated = Some(v.clone());
      }
    }
    activated.ok_or_else(not_found)
  }

  async fn active_version(&self, workflow_id: Uuid) -> Result<Option<WorkflowVersion>, StoreError> {
    let tables = self.tables.read().await;
    Ok(
      tables
        .versions
        .get(&workflow_id)
        .and_then(|vs| vs.iter().find(|v| v.is_active).cloned()),
    )
  }
}
