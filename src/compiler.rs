//! Compile a graph source (node map) into ordered compiled nodes and edges.
//!
//! One compiled node per source entry and one edge per outgoing connection, in
//! declaration order. Edge ids are fresh on every compile.

use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::CompilationError;
use crate::types::{
  CompiledEdge, CompiledNode, Connection, GraphDefinition, NodeDefinition, WorkflowGraph,
};

/// Output of [compile_graph]: storage-ready nodes and edges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledGraph {
  pub nodes: Vec<CompiledNode>,
  pub edges: Vec<CompiledEdge>,
}

impl CompiledGraph {
  pub fn into_workflow_graph(self, workflow_id: Uuid) -> WorkflowGraph {
    WorkflowGraph::new(workflow_id, self.nodes, self.edges)
  }
}

/// Projects one source node; `config_payload` is the node re-serialized with its `type`.
#[instrument(level = "trace", skip(def))]
pub(crate) fn compile_node(workflow_id: Uuid, node_id: &str, def: &NodeDefinition) -> CompiledNode {
  let position = def.position().unwrap_or_default();
  CompiledNode {
    workflow_id,
    node_id: node_id.to_string(),
    node_kind: def.kind().to_string(),
    label: def.common().label.clone(),
    position_x: position.x,
    position_y: position.y,
    config_payload: def.to_value().to_string(),
  }
}

/// Edge for one connection. The port label doubles as source port unless one is given.
pub(crate) fn compile_edge(
  workflow_id: Uuid,
  source: &str,
  connection: &Connection,
) -> CompiledEdge {
  let label = connection.port_label.clone();
  let source_port = connection
    .source_port
    .clone()
    .or_else(|| label.clone().filter(|l| !l.is_empty()));
  CompiledEdge {
    workflow_id,
    edge_id: Uuid::new_v4(),
    source_node_id: source.to_string(),
    target_node_id: connection.target_node_id.clone(),
    source_port,
    target_port: connection.target_port.clone(),
    label,
  }
}

/// Compiles an already parsed graph definition.
pub fn compile_definition(def: &GraphDefinition, workflow_id: Uuid) -> CompiledGraph {
  let mut compiled = CompiledGraph::default();
  for (node_id, node) in &def.nodes {
    compiled.nodes.push(compile_node(workflow_id, node_id, node));
    compiled.edges.extend(
      node
        .connections()
        .iter()
        .map(|c| compile_edge(workflow_id, node_id, c)),
    );
  }
  compiled
}

/// Parses and compiles a graph source document.
///
/// Fails without partial output when the document is not a node map.
#[instrument(level = "trace", skip(graph_json))]
pub fn compile_graph(
  graph_json: &str,
  workflow_id: Uuid,
) -> Result<CompiledGraph, CompilationError> {
  let def = GraphDefinition::parse(graph_json)?;
  let compiled = compile_definition(&def, workflow_id);
  info!(
    %workflow_id,
    nodes = compiled.nodes.len(),
    edges = compiled.edges.len(),
    "compiled workflow graph"
  );
  Ok(compiled)
}
