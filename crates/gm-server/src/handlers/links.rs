//! Association handlers: function-node links (and their arguments),
//! node-graph placements, program-graph links.
//!
//! `DELETE` on a link collection with both keys of a pair removes exactly that
//! link (404 if absent); with fewer keys it removes every matching link, and
//! with none it is rejected.

use axum::extract::{Path, Query, State};
use axum::Json;
use gm_core::{
    FunctionNodeId, FunctionRecord, GraphRecord, NodeGraphId, NodeGraphRecord, NodeRecord,
    ProgramGraphId, ProgramRecord,
};

use crate::error::ApiError;
use crate::schema::common::{parse_opt_ref, CreatedResponse, DeleteResponse};
use crate::schema::links::{
    AttachArgsRequest, AttachArgsResponse, AttachFunctionNodeRequest, AttachNodeGraphRequest,
    AttachProgramGraphRequest, FunctionNodeArgsResponse, FunctionNodeListResponse,
    FunctionNodeParams, NodeGraphListResponse, NodeGraphParams, ProgramGraphListResponse,
    ProgramGraphParams,
};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Function-node
// ---------------------------------------------------------------------------

/// `GET /links/function-node?function=&node=`
pub async fn list_function_nodes(
    State(state): State<AppState>,
    Query(params): Query<FunctionNodeParams>,
) -> Result<Json<FunctionNodeListResponse>, ApiError> {
    let function = parse_opt_ref::<FunctionRecord>(params.function.as_deref());
    let node = parse_opt_ref::<NodeRecord>(params.node.as_deref());
    let mut service = state.service.lock().await;
    let links = service.list_function_nodes(function.as_ref(), node.as_ref())?;
    Ok(Json(FunctionNodeListResponse { links }))
}

/// Attaches a function to a node; with `args`, binds them in the same unit.
///
/// `POST /links/function-node`
pub async fn attach_function_node(
    State(state): State<AppState>,
    Json(req): Json<AttachFunctionNodeRequest>,
) -> Result<Json<CreatedResponse<FunctionNodeId>>, ApiError> {
    let function = req.function.into_ref::<FunctionRecord>();
    let node = req.node.into_ref::<NodeRecord>();
    let mut service = state.service.lock().await;
    let id = match &req.args {
        Some(args) => service.attach_function_node(&function, &node, args)?,
        None => service.attach_function(&function, &node)?,
    };
    Ok(Json(CreatedResponse { id }))
}

/// `DELETE /links/function-node?function=&node=`
pub async fn detach_function_nodes(
    State(state): State<AppState>,
    Query(params): Query<FunctionNodeParams>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let function = parse_opt_ref::<FunctionRecord>(params.function.as_deref());
    let node = parse_opt_ref::<NodeRecord>(params.node.as_deref());
    let mut service = state.service.lock().await;
    let removed = match (&function, &node) {
        (Some(function), Some(node)) => {
            service.detach_function_node(function, node)?;
            1
        }
        _ => service.detach_function_nodes(function.as_ref(), node.as_ref())?,
    };
    Ok(Json(DeleteResponse::removed(removed)))
}

/// `GET /links/function-node/{id}/args`
pub async fn get_function_node_args(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<FunctionNodeArgsResponse>, ApiError> {
    let mut service = state.service.lock().await;
    let args = service.get_function_node_args(FunctionNodeId(id))?;
    Ok(Json(FunctionNodeArgsResponse { args }))
}

/// Binds arguments to an existing link, one per function parameter.
///
/// `POST /links/function-node/{id}/args`
pub async fn attach_args(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<AttachArgsRequest>,
) -> Result<Json<AttachArgsResponse>, ApiError> {
    let mut service = state.service.lock().await;
    let arg_ids = service.attach_args(FunctionNodeId(id), &req.args)?;
    Ok(Json(AttachArgsResponse { arg_ids }))
}

/// Clears a link's arguments so they can be bound again.
///
/// `DELETE /links/function-node/{id}/args`
pub async fn detach_args(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let mut service = state.service.lock().await;
    let removed = service.detach_args(FunctionNodeId(id))?;
    Ok(Json(DeleteResponse::removed(removed)))
}

// ---------------------------------------------------------------------------
// Node-graph
// ---------------------------------------------------------------------------

/// `GET /links/node-graph?node=&graph=`
pub async fn list_node_graphs(
    State(state): State<AppState>,
    Query(params): Query<NodeGraphParams>,
) -> Result<Json<NodeGraphListResponse>, ApiError> {
    let node = parse_opt_ref::<NodeRecord>(params.node.as_deref());
    let graph = parse_opt_ref::<GraphRecord>(params.graph.as_deref());
    let mut service = state.service.lock().await;
    let node_graphs = service.list_node_graphs(node.as_ref(), graph.as_ref())?;
    Ok(Json(NodeGraphListResponse { node_graphs }))
}

/// Places a node in a graph; without `parent` it becomes the root.
///
/// `POST /links/node-graph`
pub async fn attach_node_graph(
    State(state): State<AppState>,
    Json(req): Json<AttachNodeGraphRequest>,
) -> Result<Json<CreatedResponse<NodeGraphId>>, ApiError> {
    let node = req.node.into_ref::<NodeRecord>();
    let graph = req.graph.into_ref::<GraphRecord>();
    let mut service = state.service.lock().await;
    let id = service.attach_node_graph(&req.name, &node, &graph, req.parent.as_ref())?;
    Ok(Json(CreatedResponse { id }))
}

/// Removes every matching placement with its subtree.
///
/// `DELETE /links/node-graph?node=&graph=`
pub async fn detach_node_graphs(
    State(state): State<AppState>,
    Query(params): Query<NodeGraphParams>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let node = parse_opt_ref::<NodeRecord>(params.node.as_deref());
    let graph = parse_opt_ref::<GraphRecord>(params.graph.as_deref());
    let mut service = state.service.lock().await;
    let removed = service.detach_node_graphs(node.as_ref(), graph.as_ref())?;
    Ok(Json(DeleteResponse::removed(removed)))
}

/// `GET /links/node-graph/{id}`
pub async fn get_node_graph(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<NodeGraphRecord>, ApiError> {
    let mut service = state.service.lock().await;
    let placement = service.get_node_graph(NodeGraphId(id))?;
    Ok(Json(placement))
}

/// Removes a placement and its subtree.
///
/// `DELETE /links/node-graph/{id}`
pub async fn detach_node_graph(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let mut service = state.service.lock().await;
    let removed = service.detach_node_graph(NodeGraphId(id))?;
    Ok(Json(DeleteResponse::removed(removed)))
}

// ---------------------------------------------------------------------------
// Program-graph
// ---------------------------------------------------------------------------

/// `GET /links/program-graph?program=&graph=`
pub async fn list_program_graphs(
    State(state): State<AppState>,
    Query(params): Query<ProgramGraphParams>,
) -> Result<Json<ProgramGraphListResponse>, ApiError> {
    let program = parse_opt_ref::<ProgramRecord>(params.program.as_deref());
    let graph = parse_opt_ref::<GraphRecord>(params.graph.as_deref());
    let mut service = state.service.lock().await;
    let links = service.list_program_graphs(program.as_ref(), graph.as_ref())?;
    Ok(Json(ProgramGraphListResponse { links }))
}

/// `POST /links/program-graph`
pub async fn attach_program_graph(
    State(state): State<AppState>,
    Json(req): Json<AttachProgramGraphRequest>,
) -> Result<Json<CreatedResponse<ProgramGraphId>>, ApiError> {
    let program = req.program.into_ref::<ProgramRecord>();
    let graph = req.graph.into_ref::<GraphRecord>();
    let mut service = state.service.lock().await;
    let id = service.attach_program_graph(&program, &graph)?;
    Ok(Json(CreatedResponse { id }))
}

/// `DELETE /links/program-graph?program=&graph=`
pub async fn detach_program_graphs(
    State(state): State<AppState>,
    Query(params): Query<ProgramGraphParams>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let program = parse_opt_ref::<ProgramRecord>(params.program.as_deref());
    let graph = parse_opt_ref::<GraphRecord>(params.graph.as_deref());
    let mut service = state.service.lock().await;
    let removed = match (&program, &graph) {
        (Some(program), Some(graph)) => {
            service.detach_program_graph(program, graph)?;
            1
        }
        _ => service.detach_program_graphs(program.as_ref(), graph.as_ref())?,
    };
    Ok(Json(DeleteResponse::removed(removed)))
}
