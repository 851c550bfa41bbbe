//! Graph request/response types.

use gm_core::{GraphId, GraphRecord, NodeGraphId, NodeId, ProgramId};
use serde::{Deserialize, Serialize};

use super::common::parse_opt_ref;
use crate::service::GraphQuery;

/// Query string for `GET /graphs`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphListParams {
    /// Only graphs linked to this program (id or name).
    pub program: Option<String>,
    /// Only graphs placing this node (id or name).
    pub node: Option<String>,
    /// Only the graph containing this placement.
    pub node_graph: Option<i64>,
}

impl GraphListParams {
    pub fn into_query(self) -> GraphQuery {
        GraphQuery {
            program: parse_opt_ref(self.program.as_deref()),
            node: parse_opt_ref(self.node.as_deref()),
            node_graph: self.node_graph.map(NodeGraphId),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphListResponse {
    pub graphs: Vec<GraphRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphDetail {
    pub id: GraphId,
    pub name: String,
    pub program_ids: Vec<ProgramId>,
    /// Placed nodes, each listed once.
    pub node_ids: Vec<NodeId>,
    pub node_graph_ids: Vec<NodeGraphId>,
}
