//! Session step loop: runs nodes until the session completes, pauses or fails.

use tracing::{debug, info, instrument, warn};

use crate::error::OrchestrationError;
use crate::nodes::{ExecutorRegistry, StepInput};
use crate::types::{ExecutionSession, HistoryEntry, SessionStatus, WorkflowGraph};

pub const COMPLETED_MESSAGE: &str = "Workflow completed successfully";
pub const DEAD_END_MESSAGE: &str = "Workflow execution ended (no next node found)";

/// How one call of [run_execution_loop] ended. The session status matches.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopOutcome {
  /// End node reached, executor completed the session, or no outgoing edge matched.
  Completed { message: String },
  /// Paused at a question; `error` is set when submitted input was rejected.
  AwaitingInput {
    prompt: Option<String>,
    error: Option<String>,
  },
  Failed { error: String },
}

impl LoopOutcome {
  pub fn message(&self) -> Option<&str> {
    match self {
      Self::Completed { message } => Some(message),
      Self::AwaitingInput { prompt, .. } => prompt.as_deref(),
      Self::Failed { .. } => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      Self::Completed { .. } => None,
      Self::AwaitingInput { error, .. } => error.as_deref(),
      Self::Failed { error } => Some(error),
    }
  }
}

fn fail(session: &mut ExecutionSession, error: impl ToString) -> LoopOutcome {
  let error = error.to_string();
  warn!(
    session_id = %session.session_id,
    node_id = %session.current_node_id,
    %error,
    "execution failed"
  );
  session.status = SessionStatus::Failed;
  session.user_input = None;
  LoopOutcome::Failed { error }
}

fn complete(session: &mut ExecutionSession, message: &str) -> LoopOutcome {
  info!(
    session_id = %session.session_id,
    steps = session.execution_history.len(),
    "execution complete"
  );
  session.status = SessionStatus::Completed;
  session.pending_prompt = None;
  session.user_input = None;
  LoopOutcome::Completed {
    message: message.to_string(),
  }
}

/// Advances `session` through `graph`, executing at most `max_steps` nodes.
///
/// The session's pending user input is handed to the first executed node only.
#[instrument(
  level = "trace",
  skip(session, graph, registry),
  fields(session_id = %session.session_id)
)]
pub async fn run_execution_loop(
  session: &mut ExecutionSession,
  graph: &WorkflowGraph,
  registry: &ExecutorRegistry,
  max_steps: usize,
) -> LoopOutcome {
  session.status = SessionStatus::Running;
  let mut steps = 0;

  loop {
    let Some(node) = graph.node(&session.current_node_id) else {
      let missing = session.current_node_id.clone();
      return fail(session, OrchestrationError::NodeNotFound(missing));
    };
    if node.is_end() {
      return complete(session, COMPLETED_MESSAGE);
    }
    if steps >= max_steps {
      return fail(session, OrchestrationError::StepBudgetExceeded(max_steps));
    }
    let Some(executor) = registry.resolve(&node.node_kind) else {
      return fail(session, OrchestrationError::NoExecutor(node.node_kind.clone()));
    };
    let config = match node.config() {
      Ok(c) => c,
      Err(e) => {
        return fail(
          session,
          OrchestrationError::InvalidNodeConfig {
            node_id: node.node_id.clone(),
            reason: e.to_string(),
          },
        );
      }
    };

    steps += 1;
    info!(node_id = %node.node_id, kind = %node.node_kind, step = steps, "executing node");
    let user_input = session.user_input.take();
    let result = executor
      .execute(StepInput {
        node_id: &node.node_id,
        config: &config,
        state: &session.state_variables,
        user_input: user_input.as_ref(),
      })
      .await;
    session.record(HistoryEntry::from_result(
      &node.node_id,
      &node.node_kind,
      &result,
    ));

    if result.requires_user_input && !result.success {
      debug!(node_id = %node.node_id, "input rejected, asking again");
      session.status = SessionStatus::AwaitingInput;
      session.pending_prompt = result.message.clone();
      return LoopOutcome::AwaitingInput {
        prompt: result.message,
        error: result.error_message,
      };
    }
    if !result.success {
      let error = result
        .error_message
        .unwrap_or_else(|| format!("node '{}' failed", node.node_id));
      return fail(session, error);
    }

    session.apply_updates(&result.state_updates);

    if result.requires_user_input {
      debug!(node_id = %node.node_id, "awaiting input");
      session.status = SessionStatus::AwaitingInput;
      session.pending_prompt = result.message.clone();
      return LoopOutcome::AwaitingInput {
        prompt: result.message,
        error: None,
      };
    }
    session.pending_prompt = None;
    if result.is_complete {
      return complete(session, result.message.as_deref().unwrap_or(COMPLETED_MESSAGE));
    }

    let next = match result.next_node_id {
      Some(id) => id,
      None => match graph.select_edge(&node.node_id, result.next_port.as_deref()) {
        Some(edge) => edge.target_node_id.clone(),
        None => return complete(session, DEAD_END_MESSAGE),
      },
    };
    debug!(from = %node.node_id, to = %next, "advancing");
    session.current_node_id = next;
  }
}
