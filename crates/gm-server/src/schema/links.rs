//! Association request/response types.

use gm_core::{
    FunctionNodeArgId, FunctionNodeArgRecord, FunctionNodeRecord, NodeGraphRecord,
    ProgramGraphRecord, RefKey,
};
use serde::{Deserialize, Serialize};

/// `POST /links/function-node`. With `args`, the link and its arguments are
/// created together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachFunctionNodeRequest {
    pub function: RefKey,
    pub node: RefKey,
    #[serde(default)]
    pub args: Option<Vec<String>>,
}

/// `POST /links/function-node/{id}/args`.
#[derive(Debug, Clone, Deserialize)]
pub struct AttachArgsRequest {
    pub args: Vec<String>,
}

/// Query string for function-node listing and deletion.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FunctionNodeParams {
    pub function: Option<String>,
    pub node: Option<String>,
}

/// `POST /links/node-graph`. Without `parent` the placement becomes the
/// graph's root; a parent is a placement id or a placement name in the graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachNodeGraphRequest {
    pub name: String,
    pub node: RefKey,
    pub graph: RefKey,
    #[serde(default)]
    pub parent: Option<RefKey>,
}

/// Query string for node-graph listing and deletion.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeGraphParams {
    pub node: Option<String>,
    pub graph: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachProgramGraphRequest {
    pub program: RefKey,
    pub graph: RefKey,
}

/// Query string for program-graph listing and deletion.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgramGraphParams {
    pub program: Option<String>,
    pub graph: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionNodeListResponse {
    pub links: Vec<FunctionNodeRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionNodeArgsResponse {
    pub args: Vec<FunctionNodeArgRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttachArgsResponse {
    pub arg_ids: Vec<FunctionNodeArgId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeGraphListResponse {
    pub node_graphs: Vec<NodeGraphRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgramGraphListResponse {
    pub links: Vec<ProgramGraphRecord>,
}
