//! Binary comparison expressions over session state.
//!
//! Grammar: `<left> <op> <right>`. Operators are tried in a fixed order
//! (`==`, `!=`, `>=`, `<=`, `>`, `<`, `contains`, `startsWith`, `endsWith`);
//! the first one present that splits the expression into exactly two parts
//! wins, so `a >= b` is never read as `a > (= b)`. Without an operator the
//! whole expression names a state variable that must be boolean `true`.

use std::cmp::Ordering;

use serde_json::{Number, Value};
use tracing::instrument;

use crate::error::EvaluationError;
use crate::template::display_value;
use crate::types::StateMap;

/// Comparison operator, in lookup precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
  Eq,
  Ne,
  Ge,
  Le,
  Gt,
  Lt,
  Contains,
  StartsWith,
  EndsWith,
}

impl Operator {
  pub const ALL: [Operator; 9] = [
    Self::Eq,
    Self::Ne,
    Self::Ge,
    Self::Le,
    Self::Gt,
    Self::Lt,
    Self::Contains,
    Self::StartsWith,
    Self::EndsWith,
  ];

  pub fn token(self) -> &'static str {
    match self {
      Self::Eq => "==",
      Self::Ne => "!=",
      Self::Ge => ">=",
      Self::Le => "<=",
      Self::Gt => ">",
      Self::Lt => "<",
      Self::Contains => "contains",
      Self::StartsWith => "startsWith",
      Self::EndsWith => "endsWith",
    }
  }
}

struct Operand<'a> {
  text: &'a str,
  value: Value,
}

impl Operand<'_> {
  fn display(&self) -> String {
    display_value(&self.value)
  }

  fn as_f64(&self) -> Result<f64, EvaluationError> {
    let parsed = match &self.value {
      Value::Number(n) => n.as_f64(),
      Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
      _ => None,
    };
    parsed.ok_or_else(|| EvaluationError::NotNumeric {
      operand: self.text.to_string(),
      value: self.value.to_string(),
    })
  }
}

/// Resolves an operand: state variable, then integer, float, boolean, and finally literal text.
fn resolve<'a>(text: &'a str, state: &StateMap) -> Operand<'a> {
  let value = if let Some(v) = state.get(text) {
    v.clone()
  } else if let Ok(i) = text.parse::<i64>() {
    Value::Number(i.into())
  } else if let Some(n) = text
    .parse::<f64>()
    .ok()
    .and_then(Number::from_f64)
  {
    Value::Number(n)
  } else if text.eq_ignore_ascii_case("true") {
    Value::Bool(true)
  } else if text.eq_ignore_ascii_case("false") {
    Value::Bool(false)
  } else {
    Value::String(text.to_string())
  };
  Operand { text, value }
}

fn compare_numeric(left: &Operand<'_>, right: &Operand<'_>) -> Result<Ordering, EvaluationError> {
  let (l, r) = (left.as_f64()?, right.as_f64()?);
  Ok(l.partial_cmp(&r).unwrap_or(Ordering::Equal))
}

/// Evaluates `expression` against `state`.
///
/// Numeric operators fail with [`EvaluationError::NotNumeric`] when either side
/// cannot be read as a number.
#[instrument(level = "trace", skip(state))]
pub fn evaluate(expression: &str, state: &StateMap) -> Result<bool, EvaluationError> {
  for op in Operator::ALL {
    let token = op.token();
    if !expression.contains(token) {
      continue;
    }
    let parts: Vec<&str> = expression.split(token).map(str::trim).collect();
    let [left, right] = parts.as_slice() else {
      continue;
    };
    let left = resolve(left, state);
    let right = resolve(right.trim_matches(['\'', '"']), state);
    return Ok(match op {
      Operator::Eq => left.display() == right.display(),
      Operator::Ne => left.display() != right.display(),
      Operator::Ge => compare_numeric(&left, &right)?.is_ge(),
      Operator::Le => compare_numeric(&left, &right)?.is_le(),
      Operator::Gt => compare_numeric(&left, &right)?.is_gt(),
      Operator::Lt => compare_numeric(&left, &right)?.is_lt(),
      Operator::Contains => left.display().contains(&right.display()),
      Operator::StartsWith => left.display().starts_with(&right.display()),
      Operator::EndsWith => left.display().ends_with(&right.display()),
    });
  }
  Ok(matches!(
    resolve(expression.trim(), state).value,
    Value::Bool(true)
  ))
}
