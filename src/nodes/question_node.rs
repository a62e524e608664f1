//! Question executor: pauses for user input, validates it, stores it in state.

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::{NodeExecutor, StepInput};
use crate::error::ExecutorError;
use crate::template::{display_value, render};
use crate::types::{NodeConfig, NodeResult, StateMap};

const DEFAULT_PROMPT: &str = "Please provide input:";
const DEFAULT_STATE_KEY: &str = "userResponse";

#[derive(Debug, Clone, Copy, Default)]
pub struct QuestionNode;

/// Checks `input` against `required`, `minLength`, `maxLength` and `pattern`,
/// in that order. Returns the first violation's message.
pub(crate) fn validate_input(
  input: &str,
  rules: &NodeConfig,
) -> Result<Option<String>, ExecutorError> {
  if rules.bool("required")?.unwrap_or(false) && input.trim().is_empty() {
    return Ok(Some("This field is required.".to_string()));
  }
  let len = input.chars().count();
  if let Some(min) = rules.usize("minLength")? {
    if len < min {
      return Ok(Some(format!("Input must be at least {min} characters.")));
    }
  }
  if let Some(max) = rules.usize("maxLength")? {
    if len > max {
      return Ok(Some(format!("Input must not exceed {max} characters.")));
    }
  }
  if let Some(pattern) = rules.str("pattern")? {
    if !Regex::new(pattern)?.is_match(input) {
      let message = rules
        .str("patternMessage")?
        .unwrap_or("Input does not match the required format.");
      return Ok(Some(message.to_string()));
    }
  }
  Ok(None)
}

#[async_trait]
impl NodeExecutor for QuestionNode {
  fn family(&self) -> &'static str {
    "Question"
  }

  async fn run(&self, input: StepInput<'_>) -> Result<NodeResult, ExecutorError> {
    let prompt = render(
      &input.config.str_or("promptText", DEFAULT_PROMPT)?,
      input.state,
    );
    let state_key = input.config.str_or("stateKey", DEFAULT_STATE_KEY)?;
    let rules = input.config.section("validationRules")?;

    let answer = match input.user_input {
      None | Some(Value::Null) => return Ok(NodeResult::awaiting_input(prompt)),
      Some(value) => display_value(value),
    };

    if let Some(violation) = validate_input(&answer, &rules)? {
      debug!(node_id = %input.node_id, %violation, "input rejected");
      return Ok(NodeResult {
        success: false,
        requires_user_input: true,
        message: Some(prompt),
        error_message: Some(violation),
        ..NodeResult::default()
      });
    }

    let mut updates = StateMap::new();
    updates.insert(state_key.clone(), Value::String(answer.clone()));
    let mut output = StateMap::new();
    output.insert("question".to_string(), Value::String(prompt));
    output.insert("answer".to_string(), Value::String(answer));
    output.insert("stateKey".to_string(), Value::String(state_key));
    Ok(NodeResult::success(output).with_state_updates(updates))
  }
}
