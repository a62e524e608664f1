//! Message executor: renders `messageText` and shows it to the user.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};

use super::{NodeExecutor, StepInput};
use crate::error::ExecutorError;
use crate::template::render;
use crate::types::{NodeResult, StateMap};

#[derive(Debug, Clone, Copy, Default)]
pub struct MessageNode;

#[async_trait]
impl NodeExecutor for MessageNode {
  fn family(&self) -> &'static str {
    "Message"
  }

  async fn run(&self, input: StepInput<'_>) -> Result<NodeResult, ExecutorError> {
    let text = input.config.str("messageText")?.unwrap_or_default();
    let rendered = render(text, input.state);
    let mut output = StateMap::new();
    output.insert("message".to_string(), Value::String(rendered.clone()));
    output.insert("timestamp".to_string(), json!(Utc::now()));
    Ok(NodeResult::success(output).with_message(rendered))
  }
}
