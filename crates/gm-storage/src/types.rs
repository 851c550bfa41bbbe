//! Row filters for list queries.
//!
//! Every field is optional; present fields are combined conjunctively.
//! Filters only look at columns of the listed table. Joins across links are
//! composed by the caller from several queries.

use gm_core::{FunctionId, FunctionType, GraphId, NodeId, NodeType, ProgramId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionFilter {
    pub function_type: Option<FunctionType>,
    pub gene_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeFilter {
    pub node_type: Option<NodeType>,
    pub gene_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionNodeFilter {
    pub function: Option<FunctionId>,
    pub node: Option<NodeId>,
}

impl FunctionNodeFilter {
    pub fn pair(function: FunctionId, node: NodeId) -> Self {
        FunctionNodeFilter {
            function: Some(function),
            node: Some(node),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramGraphFilter {
    pub program: Option<ProgramId>,
    pub graph: Option<GraphId>,
}

impl ProgramGraphFilter {
    pub fn pair(program: ProgramId, graph: GraphId) -> Self {
        ProgramGraphFilter {
            program: Some(program),
            graph: Some(graph),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeGraphFilter {
    pub node: Option<NodeId>,
    pub graph: Option<GraphId>,
    pub name: Option<String>,
    /// Only placements without a parent.
    pub roots_only: bool,
}

impl NodeGraphFilter {
    pub fn in_graph(graph: GraphId) -> Self {
        NodeGraphFilter {
            graph: Some(graph),
            ..Default::default()
        }
    }
}
