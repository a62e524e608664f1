//! Typed view over one node's configuration object.

use serde_json::{Map, Value};

use crate::error::ConfigError;

/// JSON type name used in configuration errors.
pub fn value_type_name(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

/// Typed view over one node's configuration object.
///
/// Getters return `Ok(None)` when a key is absent or null and
/// [`ConfigError::WrongType`] when it is present with another JSON type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeConfig {
  values: Map<String, Value>,
}

impl NodeConfig {
  pub fn new(values: Map<String, Value>) -> Self {
    Self { values }
  }

  /// Accepts a JSON object, or null for an empty configuration.
  pub fn from_value(value: Value) -> Result<Self, ConfigError> {
    match value {
      Value::Object(values) => Ok(Self { values }),
      Value::Null => Ok(Self::default()),
      other => Err(ConfigError::WrongType {
        key: "configPayload".to_string(),
        expected: "an object",
        found: value_type_name(&other),
      }),
    }
  }

  pub fn as_map(&self) -> &Map<String, Value> {
    &self.values
  }

  pub fn insert(&mut self, key: impl Into<String>, value: Value) {
    self.values.insert(key.into(), value);
  }

  /// Raw value, `None` when absent or null.
  pub fn get(&self, key: &str) -> Option<&Value> {
    self.values.get(key).filter(|v| !v.is_null())
  }

  fn wrong_type(key: &str, expected: &'static str, found: &Value) -> ConfigError {
    ConfigError::WrongType {
      key: key.to_string(),
      expected,
      found: value_type_name(found),
    }
  }

  pub fn str(&self, key: &str) -> Result<Option<&str>, ConfigError> {
    match self.get(key) {
      None => Ok(None),
      Some(Value::String(s)) => Ok(Some(s)),
      Some(other) => Err(Self::wrong_type(key, "a string", other)),
    }
  }

  /// String value, or `default` when absent, null or empty.
  pub fn str_or(&self, key: &str, default: &str) -> Result<String, ConfigError> {
    Ok(match self.str(key)? {
      Some(s) if !s.is_empty() => s.to_string(),
      _ => default.to_string(),
    })
  }

  pub fn bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
    match self.get(key) {
      None => Ok(None),
      Some(Value::Bool(b)) => Ok(Some(*b)),
      Some(other) => Err(Self::wrong_type(key, "a boolean", other)),
    }
  }

  /// Non-negative integer value.
  pub fn usize(&self, key: &str) -> Result<Option<usize>, ConfigError> {
    match self.get(key) {
      None => Ok(None),
      Some(value) => value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .map(Some)
        .ok_or_else(|| Self::wrong_type(key, "a non-negative integer", value)),
    }
  }

  pub fn object(&self, key: &str) -> Result<Option<&Map<String, Value>>, ConfigError> {
    match self.get(key) {
      None => Ok(None),
      Some(Value::Object(m)) => Ok(Some(m)),
      Some(other) => Err(Self::wrong_type(key, "an object", other)),
    }
  }

  pub fn array(&self, key: &str) -> Result<Option<&Vec<Value>>, ConfigError> {
    match self.get(key) {
      None => Ok(None),
      Some(Value::Array(a)) => Ok(Some(a)),
      Some(other) => Err(Self::wrong_type(key, "an array", other)),
    }
  }

  /// Nested object as its own configuration view (empty when absent).
  pub fn section(&self, key: &str) -> Result<NodeConfig, ConfigError> {
    Ok(
      self
        .object(key)?
        .map(|m| NodeConfig::new(m.clone()))
        .unwrap_or_default(),
    )
  }
}
