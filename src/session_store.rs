//! Keyed storage for execution sessions.
//!
//! [InMemorySessionStore] keeps sessions in process memory with no eviction.
//! Deployments that need durability or expiry should implement [SessionStore]
//! over an external store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::types::ExecutionSession;

#[async_trait]
pub trait SessionStore: Send + Sync {
  async fn get(&self, session_id: &str) -> Result<Option<ExecutionSession>, StoreError>;

  /// Inserts or replaces the session under its id.
  async fn put(&self, session: ExecutionSession) -> Result<(), StoreError>;

  async fn remove(&self, session_id: &str) -> Result<Option<ExecutionSession>, StoreError>;

  async fn len(&self) -> Result<usize, StoreError>;
}

/// Session store backed by a `HashMap` behind a `RwLock`.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
  sessions: RwLock<HashMap<String, ExecutionSession>>,
}

impl InMemorySessionStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
  async fn get(&self, session_id: &str) -> Result<Option<ExecutionSession>, StoreError> {
    Ok(self.sessions.read().await.get(session_id).cloned())
  }

  async fn put(&self, session: ExecutionSession) -> Result<(), StoreError> {
    self
      .sessions
      .write()
      .await
      .insert(session.session_id.clone(), session);
    Ok(())
  }

  async fn remove(&self, session_id: &str) -> Result<Option<ExecutionSession>, StoreError> {
    Ok(self.sessions.write().await.remove(session_id))
  }

  async fn len(&self) -> Result<usize, StoreError> {
    Ok(self.sessions.read().await.len())
  }
}
