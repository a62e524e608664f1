//! Agent / LLM function executor. Produces a simulated model response; no model is called.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value, json};

use super::{NodeExecutor, StepInput};
use crate::error::ExecutorError;
use crate::template::render;
use crate::types::{NodeResult, StateMap};

const DEFAULT_MODEL: &str = "gpt-4";
pub(crate) const SIMULATED_MESSAGE: &str = "LLM function executed successfully (simulated)";

#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionNode;

#[async_trait]
impl NodeExecutor for FunctionNode {
  fn family(&self) -> &'static str {
    "LLM"
  }

  async fn run(&self, input: StepInput<'_>) -> Result<NodeResult, ExecutorError> {
    let config = input.config;
    // Agent nodes from the graph source carry their instruction in `prompt`.
    let instruction = match config.str("instructionPrompt")? {
      Some(s) => s,
      None => config.str("prompt")?.unwrap_or_default(),
    };
    let model = config.str_or("modelName", DEFAULT_MODEL)?;

    let input_mapping = config.section("inputMapping")?;
    let mut input_context = Map::new();
    for field in input_mapping.as_map().keys() {
      if let Some(source) = input_mapping.str(field)? {
        if let Some(value) = input.state.get(source) {
          input_context.insert(field.clone(), value.clone());
        }
      }
    }

    let prompt = render(instruction, input.state);
    let mut response = StateMap::new();
    response.insert(
      "response".to_string(),
      Value::String(format!("Simulated LLM response for: {prompt}")),
    );
    response.insert("model".to_string(), Value::String(model));
    response.insert("timestamp".to_string(), json!(Utc::now()));
    response.insert("inputContext".to_string(), Value::Object(input_context));

    let output_mapping = config.section("outputMapping")?;
    let mut updates = StateMap::new();
    for field in output_mapping.as_map().keys() {
      if let (Some(target), Some(value)) = (output_mapping.str(field)?, response.get(field)) {
        updates.insert(target.to_string(), value.clone());
      }
    }

    Ok(
      NodeResult::success(response)
        .with_state_updates(updates)
        .with_message(SIMULATED_MESSAGE),
    )
  }
}
