//! Tests for `InMemoryWorkflowStore`.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::{Workflow, WorkflowVersion};
use crate::workflow_store::{InMemoryWorkflowStore, WorkflowStore};

fn workflow(name: &str) -> Workflow {
  let now = Utc::now();
  Workflow {
    id: Uuid::new_v4(),
    name: name.to_string(),
    description: String::new(),
    graph_source: "{}".to_string(),
    nodes: Vec::new(),
    edges: Vec::new(),
    is_published: false,
    created_by: "u".to_string(),
    created_at: now,
    updated_at: now,
  }
}

fn version(workflow_id: Uuid, number: &str, active: bool) -> WorkflowVersion {
  WorkflowVersion {
    id: Uuid::new_v4(),
    workflow_id,
    version_number: number.to_string(),
    graph_snapshot: "{}".to_string(),
    change_notes: String::new(),
    is_active: active,
    created_by: "u".to_string(),
    created_at: Utc::now(),
  }
}

#[tokio::test]
async fn create_get_update_delete() {
  let store = InMemoryWorkflowStore::new();
  let mut wf = workflow("one");
  store.create(wf.clone()).await.unwrap();
  assert_eq!(store.get_by_id(wf.id).await.unwrap(), Some(wf.clone()));

  wf.name = "renamed".to_string();
  store.update(wf.clone()).await.unwrap();
  assert_eq!(store.get_by_id(wf.id).await.unwrap().unwrap().name, "renamed");

  assert!(store.delete(wf.id).await.unwrap());
  assert!(!store.delete(wf.id).await.unwrap());
  assert!(store.get_by_id(wf.id).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_create_is_rejected() {
  let store = InMemoryWorkflowStore::new();
  let wf = workflow("one");
  store.create(wf.clone()).await.unwrap();
  let err = store.create(wf.clone()).await.unwrap_err();
  assert!(matches!(err, StoreError::WorkflowExists(id) if id == wf.id));
}

#[tokio::test]
async fn update_of_unknown_workflow_fails() {
  let store = InMemoryWorkflowStore::new();
  let err = store.update(workflow("ghost")).await.unwrap_err();
  assert!(matches!(err, StoreError::WorkflowNotFound(_)));
}

#[tokio::test]
async fn list_is_most_recently_updated_first() {
  let store = InMemoryWorkflowStore::new();
  let mut older = workflow("older");
  older.updated_at = Utc::now() - Duration::hours(1);
  let newer = workflow("newer");
  store.create(older).await.unwrap();
  store.create(newer).await.unwrap();
  let names: Vec<String> = store.list().await.unwrap().into_iter().map(|w| w.name).collect();
  assert_eq!(names, vec!["newer", "older"]);
}

#[tokio::test]
async fn new_active_version_deactivates_others() {
  let store = InMemoryWorkflowStore::new();
  let wf = workflow("v");
  store.create(wf.clone()).await.unwrap();
  store.create_version(version(wf.id, "1.0", true)).await.unwrap();
  store.create_version(version(wf.id, "1.1", true)).await.unwrap();

  let versions = store.list_versions(wf.id).await.unwrap();
  let numbers: Vec<&str> = versions.iter().map(|v| v.version_number.as_str()).collect();
  assert_eq!(numbers, vec!["1.1", "1.0"]);
  assert_eq!(versions.iter().filter(|v| v.is_active).count(), 1);
  assert_eq!(
    store.active_version(wf.id).await.unwrap().unwrap().version_number,
    "1.1"
  );
}

#[tokio::test]
async fn inactive_version_leaves_active_one_alone() {
  let store = InMemoryWorkflowStore::new();
  let wf = workflow("v");
  store.create(wf.clone()).await.unwrap();
  store.create_version(version(wf.id, "1.0", true)).await.unwrap();
  store.create_version(version(wf.id, "draft", false)).await.unwrap();
  assert_eq!(
    store.active_version(wf.id).await.unwrap().unwrap().version_number,
    "1.0"
  );
}

#[tokio::test]
async fn duplicate_version_number_is_rejected() {
  let store = InMemoryWorkflowStore::new();
  let wf = workflow("v");
  store.create(wf.clone()).await.unwrap();
  store.create_version(version(wf.id, "1.0", true)).await.unwrap();
  let err = store
    .create_version(version(wf.id, "1.0", true))
    .await
    .unwrap_err();
  assert!(matches!(err, StoreError::VersionExists { ref version, .. } if version == "1.0"));
}

#[tokio::test]
async fn version_requires_existing_workflow() {
  let store = InMemoryWorkflowStore::new();
  let err = store
    .create_version(version(Uuid::new_v4(), "1.0", true))
    .await
    .unwrap_err();
  assert!(matches!(err, StoreError::WorkflowNotFound(_)));
}

#[tokio::test]
async fn activate_switches_the_active_version() {
  let store = InMemoryWorkflowStore::new();
  let wf = workflow("v");
  store.create(wf.clone()).await.unwrap();
  store.create_version(version(wf.id, "1.0", true)).await.unwrap();
  store.create_version(version(wf.id, "2.0", true)).await.unwrap();

  let activated = store.activate_version(wf.id, "1.0").await.unwrap();
  assert!(activated.is_active);
  assert_eq!(activated.version_number, "1.0");
  let active: Vec<String> = store
    .list_versions(wf.id)
    .await
    .unwrap()
    .into_iter()
    .filter(|v| v.is_active)
    .map(|v| v.version_number)
    .collect();
  assert_eq!(active, vec!["1.0"]);
}

#[tokio::test]
async fn activating_unknown_version_fails() {
  let store = InMemoryWorkflowStore::new();
  let wf = workflow("v");
  store.create(wf.clone()).await.unwrap();
  let err = store.activate_version(wf.id, "9.9").await.unwrap_err();
  assert!(matches!(err, StoreError::VersionNotFound { .. }));
  store.create_version(version(wf.id, "1.0", true)).await.unwrap();
  let err = store.activate_version(wf.id, "9.9").await.unwrap_err();
  assert!(matches!(err, StoreError::VersionNotFound { .. }));
  assert!(store.active_version(wf.id).await.unwrap().unwrap().is_active);
}

#[tokio::test]
async fn delete_removes_versions() {
  let store = InMemoryWorkflowStore::new();
  let wf = workflow("v");
  store.create(wf.clone()).await.unwrap();
  store.create_version(version(wf.id, "1.0", true)).await.unwrap();
  store.delete(wf.id).await.unwrap();
  assert!(store.list_versions(wf.id).await.unwrap().is_empty());
}
