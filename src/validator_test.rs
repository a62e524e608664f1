//! Tests for `validator`.

use serde_json::{Value, json};
use uuid::Uuid;

use crate::types::{CompiledEdge, CompiledNode, ValidationCode};
use crate::validator::{find_cycles, validate};

fn node(id: &str, kind: &str, config: Value) -> CompiledNode {
  CompiledNode {
    workflow_id: Uuid::nil(),
    node_id: id.to_string(),
    node_kind: kind.to_string(),
    label: String::new(),
    position_x: 0.0,
    position_y: 0.0,
    config_payload: config.to_string(),
  }
}

fn edge(from: &str, to: &str) -> CompiledEdge {
  CompiledEdge {
    workflow_id: Uuid::nil(),
    edge_id: Uuid::new_v4(),
    source_node_id: from.to_string(),
    target_node_id: to.to_string(),
    source_port: None,
    target_port: None,
    label: None,
  }
}

fn message(id: &str) -> CompiledNode {
  node(id, "MessageNode", json!({"messageText": "hi"}))
}

#[test]
fn linear_graph_is_clean() {
  let r = validate(
    &[
      node("s", "StartNode", json!({})),
      message("m"),
      node("e", "EndNode", json!({})),
    ],
    &[edge("s", "m"), edge("m", "e")],
  );
  assert!(r.is_valid);
  assert!(r.errors.is_empty());
  assert!(r.warnings.is_empty(), "{:?}", r.warnings);
}

#[test]
fn missing_end_is_an_error() {
  let r = validate(
    &[node("s", "StartNode", json!({})), message("m")],
    &[edge("s", "m")],
  );
  assert!(!r.is_valid);
  assert!(r.has_error(ValidationCode::NoEndNode));
}

#[test]
fn missing_start_is_an_error() {
  let r = validate(
    &[message("m"), node("e", "EndNode", json!({}))],
    &[edge("m", "e")],
  );
  assert!(r.has_error(ValidationCode::NoStartNode));
  assert_eq!(r.error_codes(), vec!["NO_START_NODE".to_string()]);
}

#[test]
fn multiple_starts_warn() {
  let r = validate(
    &[
      node("s1", "StartNode", json!({})),
      node("s2", "WebhookStart", json!({})),
      node("e", "EndNode", json!({})),
    ],
    &[edge("s1", "e"), edge("s2", "e")],
  );
  assert!(r.is_valid);
  assert!(r.has_warning(ValidationCode::MultipleStartNodes));
}

#[test]
fn unreferenced_middle_node_is_orphan_warning() {
  let r = validate(
    &[
      node("s", "StartNode", json!({})),
      message("lonely"),
      node("e", "EndNode", json!({})),
    ],
    &[edge("s", "e")],
  );
  assert!(r.is_valid);
  let orphan = r
    .warnings
    .iter()
    .find(|w| w.code == ValidationCode::OrphanNode)
    .unwrap();
  assert_eq!(orphan.node_id.as_deref(), Some("lonely"));
  assert!(r.has_warning(ValidationCode::NoOutgoingConnection));
}

#[test]
fn dead_end_warns_but_end_nodes_do_not() {
  let r = validate(
    &[
      node("s", "StartNode", json!({})),
      message("m"),
      node("e", "EndNode", json!({})),
    ],
    &[edge("s", "m"), edge("s", "e")],
  );
  let dead: Vec<_> = r
    .warnings
    .iter()
    .filter(|w| w.code == ValidationCode::NoOutgoingConnection)
    .map(|w| w.node_id.clone().unwrap())
    .collect();
  assert_eq!(dead, vec!["m".to_string()]);
}

#[test]
fn cycles_warn_once_per_path() {
  let nodes = [
    node("s", "StartNode", json!({})),
    message("a"),
    message("b"),
    node("e", "EndNode", json!({})),
  ];
  let edges = [edge("s", "a"), edge("a", "b"), edge("b", "a"), edge("b", "e")];
  assert_eq!(find_cycles(&nodes, &edges), vec!["a -> b -> a".to_string()]);
  let r = validate(&nodes, &edges);
  assert!(r.is_valid);
  assert_eq!(
    r.warnings
      .iter()
      .filter(|w| w.code == ValidationCode::CircularDependency)
      .count(),
    1
  );
}

#[test]
fn self_loop_is_a_cycle() {
  let nodes = [message("a")];
  assert_eq!(find_cycles(&nodes, &[edge("a", "a")]), vec!["a -> a".to_string()]);
}

#[test]
fn acyclic_diamond_has_no_cycles() {
  let nodes = [message("a"), message("b"), message("c"), message("d")];
  let edges = [edge("a", "b"), edge("a", "c"), edge("b", "d"), edge("c", "d")];
  assert!(find_cycles(&nodes, &edges).is_empty());
}

#[test]
fn per_kind_configuration_checks() {
  let r = validate(
    &[
      node("s", "StartNode", json!({})),
      node("api", "APICallNode", json!({"apiUrl": ""})),
      node("q", "QuestionNode", json!({})),
      node("c", "ConditionNode", json!({"branches": []})),
      node("e", "EndNode", json!({})),
    ],
    &[edge("s", "api"), edge("api", "q"), edge("q", "c"), edge("c", "e")],
  );
  assert!(!r.is_valid);
  assert!(r.has_error(ValidationCode::MissingApiUrl));
  assert!(r.has_error(ValidationCode::MissingConditions));
  assert!(r.has_warning(ValidationCode::MissingPrompt));
}

#[test]
fn source_condition_nodes_use_connections_as_branches() {
  let with_branches = node(
    "c",
    "condition",
    json!({"type": "condition", "to": [{"id": "e", "prompt": "x > 1"}]}),
  );
  let r = validate(
    &[
      node("s", "StartNode", json!({})),
      with_branches,
      node("e", "EndNode", json!({})),
    ],
    &[edge("s", "c"), edge("c", "e")],
  );
  assert!(!r.has_error(ValidationCode::MissingConditions));

  let r = validate(&[node("c", "condition", json!({"type": "condition"}))], &[]);
  assert!(r.has_error(ValidationCode::MissingConditions));
}

#[test]
fn unreadable_config_is_an_error() {
  let mut bad = message("m");
  bad.config_payload = "{not json".to_string();
  let r = validate(&[bad], &[]);
  assert!(r.has_error(ValidationCode::InvalidConfig));
}

#[test]
fn findings_serialize_with_screaming_codes() {
  let r = validate(&[], &[]);
  let v = serde_json::to_value(&r).unwrap();
  assert_eq!(v["isValid"], json!(false));
  assert_eq!(v["errors"][0]["code"], json!("NO_START_NODE"));
}
