//! `{variable}` placeholder substitution.
//!
//! Keys are applied one at a time in sorted order, each replacing every literal
//! `{key}` in the text produced so far with the value's display text. A value
//! inserted by one key is therefore seen by the keys after it, but never by the
//! keys before it. There is no escaping. Unknown placeholders stay verbatim.

use serde_json::Value;
use tracing::instrument;

use crate::types::StateMap;

/// Display text of a value: null is empty, strings are raw, everything else is compact JSON.
pub fn display_value(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    Value::String(s) => s.clone(),
    Value::Bool(b) => b.to_string(),
    Value::Number(n) => n.to_string(),
    other => other.to_string(),
  }
}

/// Renders `template` against `variables`.
#[instrument(level = "trace", skip(variables))]
pub fn render(template: &str, variables: &StateMap) -> String {
  if !template.contains('{') {
    return template.to_string();
  }
  let mut out = template.to_string();
  for (key, value) in variables {
    let placeholder = format!("{{{key}}}");
    if out.contains(&placeholder) {
      out = out.replace(&placeholder, &display_value(value));
    }
  }
  out
}

/// Name inside a bare `{name}` reference (no spaces, nothing around the braces).
pub fn bare_reference(text: &str) -> Option<&str> {
  let name = text.strip_prefix('{')?.strip_suffix('}')?;
  if name.is_empty() || name.contains(['{', '}']) || name.chars().any(char::is_whitespace) {
    return None;
  }
  Some(name)
}
