//! Error types for compilation, evaluation, storage and orchestration.

use thiserror::Error;
use uuid::Uuid;

/// The graph source could not be turned into compiled nodes and edges.
#[derive(Debug, Error)]
pub enum CompilationError {
  #[error("failed to parse graph JSON: {0}")]
  Parse(#[from] serde_json::Error),
  #[error("graph source must be a JSON object of node id to node definition")]
  NotANodeMap,
  #[error("node '{node_id}' is invalid: {reason}")]
  InvalidNode { node_id: String, reason: String },
}

/// A condition expression could not be evaluated.
#[derive(Debug, Error, PartialEq)]
pub enum EvaluationError {
  #[error("cannot compare '{operand}' numerically: value {value} is not a number")]
  NotNumeric { operand: String, value: String },
}

/// A node configuration value had the wrong JSON type.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
  #[error("config key '{key}' must be {expected}, found {found}")]
  WrongType {
    key: String,
    expected: &'static str,
    found: &'static str,
  },
  #[error("config key '{key}' is invalid: {reason}")]
  Invalid { key: String, reason: String },
}

/// Internal failure of a node executor; always surfaced as a failed node result.
#[derive(Debug, Error)]
pub enum ExecutorError {
  #[error(transparent)]
  Config(#[from] ConfigError),
  #[error(transparent)]
  Evaluation(#[from] EvaluationError),
  #[error("invalid pattern: {0}")]
  Pattern(#[from] regex::Error),
  #[error("unsupported HTTP method: {0}")]
  UnsupportedMethod(String),
  #[error("invalid header '{0}'")]
  InvalidHeader(String),
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),
}

/// Errors from workflow, session and audit stores.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("workflow not found: {0}")]
  WorkflowNotFound(Uuid),
  #[error("workflow already exists: {0}")]
  WorkflowExists(Uuid),
  #[error("version {version} already exists for workflow {workflow_id}")]
  VersionExists { workflow_id: Uuid, version: String },
  #[error("version {version} not found for workflow {workflow_id}")]
  VersionNotFound { workflow_id: Uuid, version: String },
  #[error("store backend error: {0}")]
  Backend(String),
}

/// A saved session file could not be written or read back.
#[derive(Debug, Error)]
pub enum SessionFileError {
  #[error("session file I/O failed: {0}")]
  Io(#[from] std::io::Error),
  #[error("session file is not a valid session: {0}")]
  Format(#[from] serde_json::Error),
}

/// Failures of the orchestrator itself (as opposed to a node's own logic).
#[derive(Debug, Error)]
pub enum OrchestrationError {
  #[error("workflow not found: {0}")]
  WorkflowNotFound(Uuid),
  #[error("workflow has no start node")]
  NoStartNode,
  #[error("session not found: {0}")]
  SessionNotFound(String),
  #[error("node not found: {0}")]
  NodeNotFound(String),
  #[error("no executor found for node type: {0}")]
  NoExecutor(String),
  #[error("invalid configuration for node '{node_id}': {reason}")]
  InvalidNodeConfig { node_id: String, reason: String },
  #[error("workflow execution exceeded maximum iterations ({0}), possible infinite loop")]
  StepBudgetExceeded(usize),
  #[error("failed to build HTTP client: {0}")]
  HttpClient(#[from] reqwest::Error),
  #[error(transparent)]
  Store(#[from] StoreError),
}

/// Errors surfaced by [`crate::WorkflowService`].
#[derive(Debug, Error)]
pub enum WorkflowError {
  #[error(transparent)]
  Compilation(#[from] CompilationError),
  #[error(transparent)]
  Store(#[from] StoreError),
  #[error("workflow has validation errors: {}", codes.join(", "))]
  ValidationFailed { codes: Vec<String> },
}
