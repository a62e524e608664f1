//! Static analysis over compiled nodes and edges.
//!
//! Every rule runs; none short-circuits. Errors make the graph invalid,
//! warnings (orphans, dead ends, cycles, missing prompts) never do.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument};

use crate::nodes::condition_branches;
use crate::types::{
  CompiledEdge, CompiledNode, ValidationCode, ValidationFinding, ValidationResult,
};

fn finding(
  code: ValidationCode,
  message: impl Into<String>,
  node_id: Option<&str>,
) -> ValidationFinding {
  ValidationFinding {
    code,
    message: message.into(),
    node_id: node_id.map(str::to_string),
  }
}

fn display_name(node: &CompiledNode) -> &str {
  if node.label.is_empty() {
    &node.node_id
  } else {
    &node.label
  }
}

/// Every distinct cycle reachable by depth-first search, as `a -> b -> a` paths.
#[instrument(level = "trace", skip(nodes, edges))]
pub fn find_cycles(nodes: &[CompiledNode], edges: &[CompiledEdge]) -> Vec<String> {
  let mut adjacency: HashMap<&str, Vec<&str>> = nodes
    .iter()
    .map(|n| (n.node_id.as_str(), Vec::new()))
    .collect();
  for e in edges {
    if let Some(targets) = adjacency.get_mut(e.source_node_id.as_str()) {
      targets.push(e.target_node_id.as_str());
    }
  }

  struct Search<'a> {
    adjacency: &'a HashMap<&'a str, Vec<&'a str>>,
    visited: HashSet<&'a str>,
    path: Vec<&'a str>,
    cycles: Vec<String>,
  }

  impl<'a> Search<'a> {
    fn visit(&mut self, node: &'a str) {
      if let Some(start) = self.path.iter().position(|n| *n == node) {
        let mut cycle = self.path[start..].to_vec();
        cycle.push(node);
        let cycle = cycle.join(" -> ");
        if !self.cycles.contains(&cycle) {
          self.cycles.push(cycle);
        }
        return;
      }
      if !self.visited.insert(node) {
        return;
      }
      self.path.push(node);
      let adjacency = self.adjacency;
      if let Some(targets) = adjacency.get(node) {
        for &next in targets {
          self.visit(next);
        }
      }
      self.path.pop();
    }
  }

  let mut search = Search {
    adjacency: &adjacency,
    visited: HashSet::new(),
    path: Vec::new(),
    cycles: Vec::new(),
  };
  for n in nodes {
    search.visit(&n.node_id);
  }
  search.cycles
}

fn check_node_config(
  node: &CompiledNode,
  errors: &mut Vec<ValidationFinding>,
  warnings: &mut Vec<ValidationFinding>,
) {
  let id = Some(node.node_id.as_str());
  let name = display_name(node);
  let config = match node.config() {
    Ok(c) => c,
    Err(e) => {
      errors.push(finding(
        ValidationCode::InvalidConfig,
        format!("Node '{name}' has an unreadable configuration: {e}"),
        id,
      ));
      return;
    }
  };
  let is_blank = |key: &str| !matches!(config.str(key), Ok(Some(s)) if !s.trim().is_empty());
  match node.node_kind.as_str() {
    "APICallNode" if is_blank("apiUrl") => errors.push(finding(
      ValidationCode::MissingApiUrl,
      format!("API Call node '{name}' is missing API URL"),
      id,
    )),
    "QuestionNode" if is_blank("promptText") => warnings.push(finding(
      ValidationCode::MissingPrompt,
      format!("Question node '{name}' is missing prompt text"),
      id,
    )),
    "ConditionNode" | "condition" => {
      if !matches!(condition_branches(&config), Ok(b) if !b.is_empty()) {
        errors.push(finding(
          ValidationCode::MissingConditions,
          format!("Condition node '{name}' has no condition branches defined"),
          id,
        ));
      }
    }
    _ => {}
  }
}

/// Validates a compiled graph.
#[instrument(level = "trace", skip(nodes, edges))]
pub fn validate(nodes: &[CompiledNode], edges: &[CompiledEdge]) -> ValidationResult {
  let mut errors = Vec::new();
  let mut warnings = Vec::new();

  let starts = nodes.iter().filter(|n| n.is_start()).count();
  if starts == 0 {
    errors.push(finding(
      ValidationCode::NoStartNode,
      "Workflow must have at least one start node",
      None,
    ));
  } else if starts > 1 {
    warnings.push(finding(
      ValidationCode::MultipleStartNodes,
      "Workflow has multiple start nodes. Only the first one will be used.",
      None,
    ));
  }

  if !nodes.iter().any(CompiledNode::is_end) {
    errors.push(finding(
      ValidationCode::NoEndNode,
      "Workflow must have at least one end node",
      None,
    ));
  }

  let mut touched: HashSet<&str> = HashSet::new();
  let mut sources: HashSet<&str> = HashSet::new();
  for e in edges {
    touched.insert(&e.source_node_id);
    touched.insert(&e.target_node_id);
    sources.insert(&e.source_node_id);
  }
  for n in nodes {
    if !n.is_start() && !n.is_end() && !touched.contains(n.node_id.as_str()) {
      warnings.push(finding(
        ValidationCode::OrphanNode,
        format!("Node '{}' is not connected to any other nodes", display_name(n)),
        Some(&n.node_id),
      ));
    }
  }
  for n in nodes {
    if !n.is_end() && !sources.contains(n.node_id.as_str()) {
      warnings.push(finding(
        ValidationCode::NoOutgoingConnection,
        format!("Node '{}' has no outgoing connections", display_name(n)),
        Some(&n.node_id),
      ));
    }
  }

  for cycle in find_cycles(nodes, edges) {
    warnings.push(finding(
      ValidationCode::CircularDependency,
      format!("Workflow contains a circular dependency: {cycle}"),
      None,
    ));
  }

  for n in nodes {
    check_node_config(n, &mut errors, &mut warnings);
  }

  let result = ValidationResult::from_findings(errors, warnings);
  debug!(
    is_valid = result.is_valid,
    errors = result.errors.len(),
    warnings = result.warnings.len(),
    "validated workflow graph"
  );
  result
}
