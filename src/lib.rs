//! # flowweave
//!
//! Compiles visual workflow graphs (a JSON node map produced by an editor) into
//! nodes and edges, validates them, and interprets them as resumable sessions.
//!
//! ## Architecture
//!
//! - [`compiler`] turns the graph source into [`types::CompiledNode`]s and
//!   [`types::CompiledEdge`]s.
//! - [`validator`] reports structural and per-node findings.
//! - [`nodes`] holds one executor per node kind behind [`nodes::NodeExecutor`].
//! - [`execution_loop`] advances a session until it completes, pauses for input or fails.
//! - [`runner::WorkflowRunner`] keys sessions by id and serializes calls per session.
//! - [`workflows::WorkflowService`] manages workflow lifecycle, publishing and versions.

pub mod audit;
pub mod compiler;
pub mod condition;
#[cfg(test)]
mod condition_test;
pub mod config;
#[cfg(test)]
mod config_test;
pub mod error;
pub mod execution_loop;
pub mod nodes;
pub mod runner;
pub mod session_io;
pub mod session_store;
#[cfg(test)]
mod session_store_test;
pub mod template;
pub mod types;
pub mod validator;
#[cfg(test)]
mod validator_test;
pub mod workflow_store;
#[cfg(test)]
mod workflow_store_test;
pub mod workflows;

pub use audit::{AuditSink, InMemoryAuditSink, TracingAuditSink};
pub use compiler::{CompiledGraph, compile_graph};
pub use config::EngineConfig;
pub use error::{
  CompilationError, ConfigError, EvaluationError, ExecutorError, OrchestrationError,
  SessionFileError, StoreError, WorkflowError,
};
pub use execution_loop::{LoopOutcome, run_execution_loop};
pub use nodes::{ExecutorRegistry, NodeExecutor};
pub use runner::WorkflowRunner;
pub use session_store::{InMemorySessionStore, SessionStore};
pub use types::{
  ExecuteRequest, ExecuteResponse, ExecutionSession, SessionStatus, StateMap, ValidationResult,
  WorkflowGraph,
};
pub use validator::validate;
pub use workflow_store::{InMemoryWorkflowStore, WorkflowStore};
pub use workflows::WorkflowService;
