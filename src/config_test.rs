//! Tests for `EngineConfig`.

use std::collections::HashMap;
use std::time::Duration;

use crate::config::{ENV_DEFAULT_USER, ENV_HTTP_TIMEOUT_SECS, ENV_MAX_STEPS, EngineConfig};
use crate::error::ConfigError;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
  let map: HashMap<String, String> = pairs
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
  move |key| map.get(key).cloned()
}

#[test]
fn defaults() {
  let c = EngineConfig::default();
  assert_eq!(c.max_steps, 100);
  assert_eq!(c.http_timeout(), Duration::from_secs(30));
  assert_eq!(c.default_user_id, "anonymous");
}

#[test]
fn overrides_apply() {
  let c = EngineConfig::default()
    .with_overrides(env(&[
      (ENV_MAX_STEPS, "12"),
      (ENV_HTTP_TIMEOUT_SECS, " 5 "),
      (ENV_DEFAULT_USER, "ops"),
    ]))
    .unwrap();
  assert_eq!(c.max_steps, 12);
  assert_eq!(c.http_timeout_secs, 5);
  assert_eq!(c.default_user_id, "ops");
}

#[test]
fn empty_user_override_is_ignored() {
  let c = EngineConfig::default()
    .with_overrides(env(&[(ENV_DEFAULT_USER, "  ")]))
    .unwrap();
  assert_eq!(c.default_user_id, "anonymous");
}

#[test]
fn unparsable_override_fails() {
  let err = EngineConfig::default()
    .with_overrides(env(&[(ENV_MAX_STEPS, "lots")]))
    .unwrap_err();
  assert!(matches!(err, ConfigError::Invalid { key, .. } if key == ENV_MAX_STEPS));
}

#[test]
fn zero_step_budget_is_rejected() {
  assert!(
    EngineConfig::default()
      .with_overrides(env(&[(ENV_MAX_STEPS, "0")]))
      .is_err()
  );
}

#[test]
fn load_reads_partial_json() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("engine.json");
  std::fs::write(&path, r#"{"maxSteps": 7}"#).unwrap();
  let c = EngineConfig::load(&path).unwrap();
  assert_eq!(c.max_steps, 7);
  assert_eq!(c.http_timeout_secs, 30);
}

#[test]
fn load_missing_file_fails() {
  let dir = tempfile::tempdir().unwrap();
  assert!(EngineConfig::load(&dir.path().join("nope.json")).is_err());
}
