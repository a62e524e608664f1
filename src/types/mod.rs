//! Workflow engine types: graph source, compiled graph, sessions and results.
//!
//! Values flowing through configuration, state and node output are plain
//! [`serde_json::Value`]s.

use std::collections::BTreeMap;

use serde_json::Value;

mod compiled_edge;
mod compiled_node;
#[cfg(test)]
mod compiled_node_test;
mod execution_request;
mod execution_session;
mod graph_definition;
mod node_config;
mod node_result;
mod validation;
mod workflow;
mod workflow_graph;

pub use compiled_edge::CompiledEdge;
pub use compiled_node::{CompiledNode, kind_is_end, kind_is_start};
pub use execution_request::{ExecuteRequest, ExecuteResponse};
pub use execution_session::{ExecutionSession, HistoryEntry, SessionStatus};
pub use graph_definition::{
  ActionNode, AgentNode, Connection, CustomNode, GraphDefinition, NodeCommon, NodeDefinition,
  NoteNode, Position, Skill, TriggerNode,
};
pub use node_config::{NodeConfig, value_type_name};
pub use node_result::NodeResult;
pub use validation::{ValidationCode, ValidationFinding, ValidationResult};
pub use workflow::{AuditEntry, NewWorkflow, Workflow, WorkflowUpdate, WorkflowVersion};
pub use workflow_graph::WorkflowGraph;

/// Key-value state carried by a session; also used for node output and updates.
///
/// Keys are sorted so that iteration (and template substitution) is stable.
pub type StateMap = BTreeMap<String, Value>;
