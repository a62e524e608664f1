//! Executable view over a compiled workflow: nodes by id plus ordered edges.

use std::collections::HashMap;

use tracing::instrument;
use uuid::Uuid;

use super::{CompiledEdge, CompiledNode};

/// Executable view over a compiled workflow.
///
/// Nodes and edges keep compiled (declaration) order, so edge selection and
/// start lookup are deterministic.
#[derive(Debug, Clone, Default)]
pub struct WorkflowGraph {
  pub workflow_id: Uuid,
  nodes: Vec<CompiledNode>,
  edges: Vec<CompiledEdge>,
  index: HashMap<String, usize>,
}

impl WorkflowGraph {
  pub fn new(workflow_id: Uuid, nodes: Vec<CompiledNode>, edges: Vec<CompiledEdge>) -> Self {
    let mut index = HashMap::with_capacity(nodes.len());
    for (i, n) in nodes.iter().enumerate() {
      index.entry(n.node_id.clone()).or_insert(i);
    }
    Self {
      workflow_id,
      nodes,
      edges,
      index,
    }
  }

  pub fn nodes(&self) -> &[CompiledNode] {
    &self.nodes
  }

  pub fn edges(&self) -> &[CompiledEdge] {
    &self.edges
  }

  pub fn node(&self, node_id: &str) -> Option<&CompiledNode> {
    self.index.get(node_id).map(|&i| &self.nodes[i])
  }

  /// First start-kind node in compiled order, else the node with id `start`.
  pub fn find_start(&self) -> Option<&CompiledNode> {
    self
      .nodes
      .iter()
      .find(|n| n.is_start())
      .or_else(|| self.node("start"))
  }

  pub fn outgoing_edges(&self, node_id: &str) -> Vec<&CompiledEdge> {
    self
      .edges
      .iter()
      .filter(|e| e.source_node_id == node_id)
      .collect()
  }

  /// First outgoing edge leaving through `port` (any edge when the port is empty).
  #[instrument(level = "trace", skip(self))]
  pub fn select_edge(&self, node_id: &str, port: Option<&str>) -> Option<&CompiledEdge> {
    self
      .outgoing_edges(node_id)
      .into_iter()
      .find(|e| e.matches_port(port))
  }
}
