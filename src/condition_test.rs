//! Tests for `condition`.

use serde_json::json;

use crate::condition::evaluate;
use crate::error::EvaluationError;
use crate::types::StateMap;

fn state(pairs: &[(&str, serde_json::Value)]) -> StateMap {
  pairs
    .iter()
    .map(|(k, v)| (k.to_string(), v.clone()))
    .collect()
}

#[test]
fn numeric_comparisons_against_state() {
  let s = state(&[("age", json!(20))]);
  assert!(evaluate("age > 18", &s).unwrap());
  assert!(!evaluate("age < 18", &s).unwrap());
  assert!(evaluate("age >= 20", &s).unwrap());
  assert!(evaluate("age <= 20", &s).unwrap());
  assert!(!evaluate("age >= 21", &s).unwrap());
}

#[test]
fn string_operators() {
  let s = state(&[("name", json!("John"))]);
  assert!(evaluate("name contains 'oh'", &s).unwrap());
  assert!(evaluate("name startsWith \"Jo\"", &s).unwrap());
  assert!(evaluate("name endsWith 'hn'", &s).unwrap());
  assert!(!evaluate("name contains 'x'", &s).unwrap());
}

#[test]
fn equality_compares_display_text() {
  let s = state(&[("status", json!("active")), ("count", json!(3)), ("flag", json!(true))]);
  assert!(evaluate("status == 'active'", &s).unwrap());
  assert!(evaluate("status != 'inactive'", &s).unwrap());
  assert!(evaluate("count == 3", &s).unwrap());
  assert!(evaluate("count == '3'", &s).unwrap());
  assert!(evaluate("flag == True", &s).unwrap());
}

#[test]
fn right_operand_can_name_a_state_variable() {
  let s = state(&[("a", json!(5)), ("b", json!(7))]);
  assert!(evaluate("b > a", &s).unwrap());
  assert!(evaluate("a < 'b'", &s).unwrap());
}

#[test]
fn numeric_strings_coerce() {
  let s = state(&[("input", json!("42"))]);
  assert!(evaluate("input > 41.5", &s).unwrap());
}

#[test]
fn non_numeric_comparison_is_an_error() {
  let s = state(&[("name", json!("John"))]);
  assert_eq!(
    evaluate("name > 3", &s).unwrap_err(),
    EvaluationError::NotNumeric {
      operand: "name".to_string(),
      value: "\"John\"".to_string(),
    }
  );
  let s = state(&[("flag", json!(true))]);
  assert!(evaluate("flag > 0", &s).is_err());
}

#[test]
fn bare_variable_must_be_true() {
  let s = state(&[("ok", json!(true)), ("no", json!(false)), ("text", json!("true"))]);
  assert!(evaluate("ok", &s).unwrap());
  assert!(evaluate("  ok  ", &s).unwrap());
  assert!(!evaluate("no", &s).unwrap());
  assert!(!evaluate("missing", &s).unwrap());
  assert!(!evaluate("text", &s).unwrap());
}

#[test]
fn bare_boolean_literal() {
  assert!(evaluate("true", &StateMap::new()).unwrap());
  assert!(!evaluate("false", &StateMap::new()).unwrap());
}

#[test]
fn operator_precedence_follows_fixed_order() {
  // `==` is checked before `contains`, even though `contains` appears first.
  let s = state(&[("note", json!("x"))]);
  assert!(!evaluate("note contains a == b", &s).unwrap());
  // `>=` splits before `>` is considered.
  let s = state(&[("n", json!(5))]);
  assert!(evaluate("n >= 5", &s).unwrap());
}

#[test]
fn operator_with_wrong_part_count_is_skipped() {
  // `==` splits into three parts and is skipped; no later operator matches,
  // so the whole text is looked up as a variable.
  let s = state(&[("a == b == c", json!(true))]);
  assert!(evaluate("a == b == c", &s).unwrap());
}

#[test]
fn missing_left_variable_is_literal_text() {
  assert!(evaluate("hello == hello", &StateMap::new()).unwrap());
  assert!(!evaluate("hello == world", &StateMap::new()).unwrap());
}

#[test]
fn float_literals() {
  let s = state(&[("price", json!(9.99))]);
  assert!(evaluate("price < 10", &s).unwrap());
  assert!(evaluate("price > 9.5", &s).unwrap());
}
