//! Node request/response types.

use gm_core::{FunctionId, GraphId, NodeId, NodeRecord, NodeType};
use serde::{Deserialize, Serialize};

use super::common::parse_opt_ref;
use crate::service::NodeQuery;

/// Query string for `GET /nodes`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeListParams {
    #[serde(rename = "type")]
    pub node_type: Option<NodeType>,
    pub gene_type: Option<String>,
    /// Only nodes hosting this function (id or name).
    pub function: Option<String>,
    /// Only nodes placed in this graph (id or name).
    pub graph: Option<String>,
}

impl NodeListParams {
    pub fn into_query(self) -> NodeQuery {
        NodeQuery {
            node_type: self.node_type,
            gene_type: self.gene_type,
            function: parse_opt_ref(self.function.as_deref()),
            graph: parse_opt_ref(self.graph.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeListResponse {
    pub nodes: Vec<NodeRecord>,
}

/// A node with the ids of the functions it hosts and the graphs placing it.
#[derive(Debug, Clone, Serialize)]
pub struct NodeDetail {
    pub id: NodeId,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub gene_type: String,
    pub function_ids: Vec<FunctionId>,
    pub graph_ids: Vec<GraphId>,
}
