//! Tests for `ExecutorRegistry`.

use crate::config::EngineConfig;
use crate::nodes::{ExecutorRegistry, NodeExecutor};

#[test]
fn defaults_cover_every_executor_kind() {
  let registry = ExecutorRegistry::with_defaults(&EngineConfig::default()).unwrap();
  for kind in [
    "StartNode",
    "trigger",
    "MessageNode",
    "QuestionNode",
    "APICallNode",
    "ConditionNode",
    "condition",
    "FunctionNode",
    "agent",
    "StateUpdateNode",
  ] {
    assert!(registry.contains(kind), "missing {kind}");
  }
}

#[test]
fn families() {
  let registry = ExecutorRegistry::with_defaults(&EngineConfig::default()).unwrap();
  assert_eq!(registry.resolve("agent").unwrap().family(), "LLM");
  assert_eq!(registry.resolve("condition").unwrap().family(), "Condition");
}

#[test]
fn other_start_kinds_resolve_to_pass_through() {
  let registry = ExecutorRegistry::with_defaults(&EngineConfig::default()).unwrap();
  assert_eq!(registry.resolve("WebhookStart").unwrap().family(), "Start");
}

#[test]
fn unknown_kinds_do_not_resolve() {
  let registry = ExecutorRegistry::with_defaults(&EngineConfig::default()).unwrap();
  assert!(registry.resolve("action").is_none());
  assert!(registry.resolve("EndNode").is_none());
  assert!(ExecutorRegistry::new().resolve("StartNode").is_none());
}
