//! Composition views: nested read models rebuilt from the relational rows.

use gm_core::{
    FunctionId, FunctionNodeId, FunctionType, GlobalVarId, GraphId, LibraryRecord, NodeGraphId,
    NodeId, NodeType, ProgramId,
};
use serde::Serialize;

/// A parameter paired with the argument bound to it on one link.
///
/// `arg` is `None` while the link has no arguments yet.
#[derive(Debug, Clone, Serialize)]
pub struct BoundParamView {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    pub is_const: bool,
    pub is_ref: bool,
    pub arg: Option<String>,
}

/// A function as hosted by one node.
#[derive(Debug, Clone, Serialize)]
pub struct HostedFunctionView {
    pub link_id: FunctionNodeId,
    pub function_id: FunctionId,
    pub name: String,
    #[serde(rename = "type")]
    pub function_type: FunctionType,
    pub gene_type: String,
    pub code: String,
    pub params: Vec<BoundParamView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    pub id: NodeId,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub gene_type: String,
    pub functions: Vec<HostedFunctionView>,
}

/// One placement of the tree, flattened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEdgeView {
    pub id: NodeGraphId,
    pub name: String,
    pub parent: Option<String>,
    pub node: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphView {
    pub id: GraphId,
    pub name: String,
    /// Placements in creation order; a parent always precedes its children.
    pub edges: Vec<TreeEdgeView>,
    /// Every placed node, once, in order of first placement.
    pub nodes: Vec<NodeView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GlobalVarView {
    pub id: GlobalVarId,
    pub name: String,
    #[serde(rename = "type")]
    pub var_type: String,
    pub is_const: bool,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgramView {
    pub id: ProgramId,
    pub name: String,
    pub libraries: Vec<LibraryRecord>,
    pub global_vars: Vec<GlobalVarView>,
    pub graphs: Vec<GraphView>,
}
