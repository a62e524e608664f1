//! Pass-through executor for start and trigger nodes.

use async_trait::async_trait;
use tracing::trace;

use super::{NodeExecutor, StepInput};
use crate::error::ExecutorError;
use crate::types::{NodeResult, StateMap};

/// Succeeds with empty output; the orchestrator then follows the first outgoing edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughNode;

#[async_trait]
impl NodeExecutor for PassThroughNode {
  fn family(&self) -> &'static str {
    "Start"
  }

  async fn run(&self, input: StepInput<'_>) -> Result<NodeResult, ExecutorError> {
    trace!(node_id = %input.node_id, "pass-through");
    Ok(NodeResult::success(StateMap::new()))
  }
}
