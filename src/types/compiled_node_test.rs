//! Tests for `CompiledNode` and the kind predicates.

use serde_json::json;
use uuid::Uuid;

use super::compiled_node::{CompiledNode, kind_is_end, kind_is_start};

fn node(id: &str, kind: &str, payload: &str) -> CompiledNode {
  CompiledNode {
    workflow_id: Uuid::nil(),
    node_id: id.to_string(),
    node_kind: kind.to_string(),
    label: String::new(),
    position_x: 0.0,
    position_y: 0.0,
    config_payload: payload.to_string(),
  }
}

#[test]
fn start_kind_predicate() {
  assert!(kind_is_start("StartNode"));
  assert!(kind_is_start("WebhookStart"));
  assert!(!kind_is_start("trigger"));
  assert!(!kind_is_start("startnode"));
}

#[test]
fn end_kind_predicate() {
  assert!(kind_is_end("EndNode"));
  assert!(kind_is_end("EndConversation"));
  assert!(!kind_is_end("MessageNode"));
}

#[test]
fn is_start_and_is_end_use_kind() {
  assert!(node("s", "StartNode", "{}").is_start());
  assert!(node("e", "EndNode", "{}").is_end());
  assert!(!node("m", "MessageNode", "{}").is_end());
}

#[test]
fn config_parses_payload() {
  let n = node("m", "MessageNode", r#"{"type": "MessageNode", "messageText": "Hi"}"#);
  let cfg = n.config().unwrap();
  assert_eq!(cfg.get("messageText"), Some(&json!("Hi")));
}

#[test]
fn empty_payload_is_empty_config() {
  let cfg = node("m", "MessageNode", "").config().unwrap();
  assert!(cfg.get("messageText").is_none());
}

#[test]
fn malformed_payload_is_config_error() {
  assert!(node("m", "MessageNode", "{oops").config().is_err());
}
