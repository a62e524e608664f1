//! Static analysis findings over a compiled graph.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Finding code, serialized as e.g. `NO_START_NODE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
  NoStartNode,
  MultipleStartNodes,
  NoEndNode,
  OrphanNode,
  NoOutgoingConnection,
  CircularDependency,
  MissingApiUrl,
  MissingPrompt,
  MissingConditions,
  InvalidConfig,
}

impl ValidationCode {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::NoStartNode => "NO_START_NODE",
      Self::MultipleStartNodes => "MULTIPLE_START_NODES",
      Self::NoEndNode => "NO_END_NODE",
      Self::OrphanNode => "ORPHAN_NODE",
      Self::NoOutgoingConnection => "NO_OUTGOING_CONNECTION",
      Self::CircularDependency => "CIRCULAR_DEPENDENCY",
      Self::MissingApiUrl => "MISSING_API_URL",
      Self::MissingPrompt => "MISSING_PROMPT",
      Self::MissingConditions => "MISSING_CONDITIONS",
      Self::InvalidConfig => "INVALID_CONFIG",
    }
  }
}

impl fmt::Display for ValidationCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFinding {
  pub code: ValidationCode,
  pub message: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub node_id: Option<String>,
}

/// Errors make a graph invalid; warnings never do.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
  pub is_valid: bool,
  pub errors: Vec<ValidationFinding>,
  pub warnings: Vec<ValidationFinding>,
}

impl ValidationResult {
  pub fn from_findings(errors: Vec<ValidationFinding>, warnings: Vec<ValidationFinding>) -> Self {
    Self {
      is_valid: errors.is_empty(),
      errors,
      warnings,
    }
  }

  pub fn has_error(&self, code: ValidationCode) -> bool {
    self.errors.iter().any(|f| f.code == code)
  }

  pub fn has_warning(&self, code: ValidationCode) -> bool {
    self.warnings.iter().any(|f| f.code == code)
  }

  pub fn error_codes(&self) -> Vec<String> {
    self.errors.iter().map(|f| f.code.to_string()).collect()
  }
}
