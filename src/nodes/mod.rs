//! Node executors: one per node kind, each a function of
//! (configuration, state, optional user input) to [`NodeResult`].
//!
//! Executors never fail across their boundary; internal errors become a failed
//! result whose message names the node family.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::EngineConfig;
use crate::error::{ExecutorError, OrchestrationError};
use crate::types::{NodeConfig, NodeResult, StateMap, kind_is_start};

mod api_call_node;
mod condition_node;
mod function_node;
mod message_node;
mod pass_through_node;
mod question_node;
#[cfg(test)]
mod registry_test;
mod state_update_node;

pub use api_call_node::ApiCallNode;
pub use condition_node::{Branch, ConditionNode};
pub(crate) use condition_node::branches as condition_branches;
pub use function_node::FunctionNode;
pub use message_node::MessageNode;
pub use pass_through_node::PassThroughNode;
pub use question_node::QuestionNode;
pub use state_update_node::StateUpdateNode;

/// Everything an executor may read for one step.
#[derive(Debug, Clone, Copy)]
pub struct StepInput<'a> {
  pub node_id: &'a str,
  pub config: &'a NodeConfig,
  pub state: &'a StateMap,
  pub user_input: Option<&'a Value>,
}

/// Executes one node kind.
#[async_trait]
pub trait NodeExecutor: Send + Sync {
  /// Node family used in failure messages, e.g. `Condition`.
  fn family(&self) -> &'static str;

  async fn run(&self, input: StepInput<'_>) -> Result<NodeResult, ExecutorError>;

  /// Runs the node, folding any internal error into a failed result.
  async fn execute(&self, input: StepInput<'_>) -> NodeResult {
    match self.run(input).await {
      Ok(result) => result,
      Err(e) => NodeResult::failure(format!("{} node execution failed: {e}", self.family())),
    }
  }
}

/// Executors keyed by node kind, built once.
#[derive(Clone, Default)]
pub struct ExecutorRegistry {
  executors: HashMap<String, Arc<dyn NodeExecutor>>,
}

impl std::fmt::Debug for ExecutorRegistry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let mut kinds: Vec<&String> = self.executors.keys().collect();
    kinds.sort();
    f.debug_struct("ExecutorRegistry").field("kinds", &kinds).finish()
  }
}

impl ExecutorRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registry with every built-in executor and its source-format aliases.
  pub fn with_defaults(config: &EngineConfig) -> Result<Self, OrchestrationError> {
    let api = ApiCallNode::new(config.http_timeout())?;
    Ok(Self::with_api_call_node(api))
  }

  /// Built-in executors using the given APICall executor.
  pub fn with_api_call_node(api: ApiCallNode) -> Self {
    let pass_through: Arc<dyn NodeExecutor> = Arc::new(PassThroughNode);
    let condition: Arc<dyn NodeExecutor> = Arc::new(ConditionNode);
    let function: Arc<dyn NodeExecutor> = Arc::new(FunctionNode);
    let mut registry = Self::new();
    registry.register_shared("StartNode", Arc::clone(&pass_through));
    registry.register_shared("trigger", pass_through);
    registry.register("MessageNode", MessageNode);
    registry.register("QuestionNode", QuestionNode);
    registry.register("APICallNode", api);
    registry.register_shared("ConditionNode", Arc::clone(&condition));
    registry.register_shared("condition", condition);
    registry.register_shared("FunctionNode", Arc::clone(&function));
    registry.register_shared("agent", function);
    registry.register("StateUpdateNode", StateUpdateNode);
    registry
  }

  pub fn register(&mut self, kind: impl Into<String>, executor: impl NodeExecutor + 'static) {
    self.executors.insert(kind.into(), Arc::new(executor));
  }

  pub fn register_shared(&mut self, kind: impl Into<String>, executor: Arc<dyn NodeExecutor>) {
    self.executors.insert(kind.into(), executor);
  }

  /// Executor for `kind`; unregistered start-kind tags resolve to the start executor.
  pub fn resolve(&self, kind: &str) -> Option<Arc<dyn NodeExecutor>> {
    self.executors.get(kind).cloned().or_else(|| {
      if kind_is_start(kind) {
        self.executors.get("StartNode").cloned()
      } else {
        None
      }
    })
  }

  pub fn contains(&self, kind: &str) -> bool {
    self.resolve(kind).is_some()
  }
}
