//! StateUpdate executor: writes configured values into session state.

use async_trait::async_trait;
use serde_json::Value;

use super::{NodeExecutor, StepInput};
use crate::error::ExecutorError;
use crate::template::{bare_reference, render};
use crate::types::{NodeResult, StateMap};

#[derive(Debug, Clone, Copy, Default)]
pub struct StateUpdateNode;

/// Bare `{name}` references to existing variables keep their type; other strings are rendered.
fn resolve_value(value: &Value, state: &StateMap) -> Value {
  match value {
    Value::String(s) => bare_reference(s)
      .and_then(|name| state.get(name))
      .cloned()
      .unwrap_or_else(|| Value::String(render(s, state))),
    other => other.clone(),
  }
}

#[async_trait]
impl NodeExecutor for StateUpdateNode {
  fn family(&self) -> &'static str {
    "State update"
  }

  async fn run(&self, input: StepInput<'_>) -> Result<NodeResult, ExecutorError> {
    let updates: StateMap = input
      .config
      .object("updates")?
      .map(|m| {
        m.iter()
          .map(|(k, v)| (k.clone(), resolve_value(v, input.state)))
          .collect()
      })
      .unwrap_or_default();
    let keys: Vec<Value> = updates.keys().cloned().map(Value::String).collect();
    let mut output = StateMap::new();
    output.insert("updatedKeys".to_string(), Value::Array(keys));
    output.insert("updateCount".to_string(), Value::from(updates.len()));
    Ok(NodeResult::success(output).with_state_updates(updates))
  }
}
