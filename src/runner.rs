//! Session-keyed workflow runner: the execution entry point.
//!
//! - A request without a session id starts a new session at the workflow's start node.
//! - A request with a session id resumes that session with the supplied user input.
//!
//! Calls for the same session id are serialized; distinct sessions run concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::audit::{ACTION_EXECUTED, ACTION_EXECUTION_FAILED, AuditSink};
use crate::config::EngineConfig;
use crate::error::OrchestrationError;
use crate::execution_loop::{COMPLETED_MESSAGE, run_execution_loop};
use crate::nodes::ExecutorRegistry;
use crate::session_store::SessionStore;
use crate::types::{
  AuditEntry, ExecuteRequest, ExecuteResponse, ExecutionSession, SessionStatus, WorkflowGraph,
};
use crate::workflow_store::WorkflowStore;

/// Runs and resumes workflow sessions.
pub struct WorkflowRunner {
  workflows: Arc<dyn WorkflowStore>,
  sessions: Arc<dyn SessionStore>,
  audit: Arc<dyn AuditSink>,
  registry: ExecutorRegistry,
  config: EngineConfig,
  locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl WorkflowRunner {
  pub fn new(
    workflows: Arc<dyn WorkflowStore>,
    sessions: Arc<dyn SessionStore>,
    audit: Arc<dyn AuditSink>,
    registry: ExecutorRegistry,
    config: EngineConfig,
  ) -> Self {
    Self {
      workflows,
      sessions,
      audit,
      registry,
      config,
      locks: Mutex::new(HashMap::new()),
    }
  }

  pub fn config(&self) -> &EngineConfig {
    &self.config
  }

  pub fn sessions(&self) -> &Arc<dyn SessionStore> {
    &self.sessions
  }

  /// Lock for one session id, created on first use.
  async fn session_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
    let mut locks = self.locks.lock().await;
    Arc::clone(locks.entry(session_id.to_string()).or_default())
  }

  /// Gives back a lock from [Self::session_lock]; the entry is dropped once no caller holds it.
  async fn release_lock(&self, session_id: &str, lock: Arc<Mutex<()>>) {
    let mut locks = self.locks.lock().await;
    drop(lock);
    if locks
      .get(session_id)
      .is_some_and(|entry| Arc::strong_count(entry) == 1)
    {
      locks.remove(session_id);
    }
  }

  #[cfg(test)]
  pub(crate) async fn lock_count(&self) -> usize {
    self.locks.lock().await.len()
  }

  async fn find_session(
    &self,
    session_id: &str,
    workflow_id: Uuid,
  ) -> Result<ExecutionSession, OrchestrationError> {
    match self.sessions.get(session_id).await? {
      Some(session) if session.workflow_id == workflow_id => Ok(session),
      _ => Err(OrchestrationError::SessionNotFound(session_id.to_string())),
    }
  }

  async fn load_graph(&self, workflow_id: Uuid) -> Result<WorkflowGraph, OrchestrationError> {
    let workflow = self
      .workflows
      .get_by_id(workflow_id)
      .await?
      .ok_or(OrchestrationError::WorkflowNotFound(workflow_id))?;
    Ok(WorkflowGraph::new(workflow.id, workflow.nodes, workflow.edges))
  }

  /// Starts or resumes a session and runs it until it completes, pauses or fails.
  ///
  /// Never returns an error: every failure is reported in the response with
  /// whatever state and history exist.
  #[instrument(level = "trace", skip(self, request), fields(workflow_id = %request.workflow_id))]
  pub async fn execute(&self, request: ExecuteRequest) -> ExecuteResponse {
    match request.session_id.clone() {
      Some(session_id) => self.resume(session_id, request).await,
      None => self.start(request).await,
    }
  }

  async fn start(&self, request: ExecuteRequest) -> ExecuteResponse {
    let graph = match self.load_graph(request.workflow_id).await {
      Ok(g) => g,
      Err(e) => return ExecuteResponse::rejected(None, e.to_string()),
    };
    let Some(start) = graph.find_start() else {
      return ExecuteResponse::rejected(None, OrchestrationError::NoStartNode.to_string());
    };
    let user_id = request
      .user_id
      .clone()
      .unwrap_or_else(|| self.config.default_user_id.clone());
    let mut session = ExecutionSession::new(
      request.workflow_id,
      user_id,
      start.node_id.clone(),
      request.initial_state.unwrap_or_default(),
    );
    session.user_input = request.user_input;
    info!(session_id = %session.session_id, start = %session.current_node_id, "starting session");
    // No other caller knows a fresh session id yet, so no lock is needed.
    self.run(session, &graph).await
  }

  async fn resume(&self, session_id: String, request: ExecuteRequest) -> ExecuteResponse {
    // Unknown ids are rejected before a lock entry exists for them.
    if let Err(e) = self.find_session(&session_id, request.workflow_id).await {
      return ExecuteResponse::rejected(Some(session_id), e.to_string());
    }
    let lock = self.session_lock(&session_id).await;
    let response = {
      let _guard = lock.lock().await;
      self.resume_locked(&session_id, request).await
    };
    self.release_lock(&session_id, lock).await;
    response
  }

  /// Re-reads the session under its lock so a concurrent call's result is seen.
  async fn resume_locked(&self, session_id: &str, request: ExecuteRequest) -> ExecuteResponse {
    let mut session = match self.find_session(session_id, request.workflow_id).await {
      Ok(s) => s,
      Err(e) => return ExecuteResponse::rejected(Some(session_id.to_string()), e.to_string()),
    };
    if session.status == SessionStatus::Completed {
      return ExecuteResponse::from_session(&session, Some(COMPLETED_MESSAGE.to_string()), None);
    }
    let graph = match self.load_graph(session.workflow_id).await {
      Ok(g) => g,
      Err(e) => return ExecuteResponse::from_session(&session, None, Some(e.to_string())),
    };
    info!(%session_id, node_id = %session.current_node_id, "resuming session");
    session.user_input = request.user_input;
    self.run(session, &graph).await
  }

  async fn run(&self, mut session: ExecutionSession, graph: &WorkflowGraph) -> ExecuteResponse {
    let outcome =
      run_execution_loop(&mut session, graph, &self.registry, self.config.max_steps).await;
    let mut response = ExecuteResponse::from_session(
      &session,
      outcome.message().map(str::to_string),
      outcome.error().map(str::to_string),
    );
    if let Err(e) = self.sessions.put(session.clone()).await {
      warn!(session_id = %session.session_id, error = %e, "failed to persist session");
      response.success = false;
      response.error_message = Some(format!("failed to persist session: {e}"));
    }
    self.record_execution(&session, response.success).await;
    response
  }

  async fn record_execution(&self, session: &ExecutionSession, success: bool) {
    let action = if success {
      ACTION_EXECUTED
    } else {
      ACTION_EXECUTION_FAILED
    };
    let entry = AuditEntry::new(session.workflow_id, action, &session.user_id)
      .with_session(&session.session_id)
      .with_details(json!({
        "nodesExecuted": session.execution_history.len(),
        "finalState": session.state_variables,
      }));
    if let Err(e) = self.audit.record(entry).await {
      warn!(session_id = %session.session_id, error = %e, "failed to record audit entry");
    }
  }
}
