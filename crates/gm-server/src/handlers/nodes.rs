//! Node handlers (create, get, list, delete, compose).

use axum::extract::{Path, Query, State};
use axum::Json;
use gm_core::{NewNode, NodeId, NodeRecord};

use crate::error::ApiError;
use crate::schema::common::{parse_ref, CreatedResponse};
use crate::schema::compose::NodeView;
use crate::schema::nodes::{NodeDetail, NodeListParams, NodeListResponse};
use crate::state::AppState;

/// `GET /nodes?type=&gene_type=&function=&graph=`
pub async fn list_nodes(
    State(state): State<AppState>,
    Query(params): Query<NodeListParams>,
) -> Result<Json<NodeListResponse>, ApiError> {
    let mut service = state.service.lock().await;
    let nodes = service.list_nodes(&params.into_query())?;
    Ok(Json(NodeListResponse { nodes }))
}

/// `POST /nodes`
pub async fn create_node(
    State(state): State<AppState>,
    Json(req): Json<NewNode>,
) -> Result<Json<CreatedResponse<NodeId>>, ApiError> {
    let mut service = state.service.lock().await;
    let id = service.create_node(&req)?;
    Ok(Json(CreatedResponse { id }))
}

/// `GET /nodes/{key}`
pub async fn get_node(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<NodeDetail>, ApiError> {
    let mut service = state.service.lock().await;
    let detail = service.get_node(&parse_ref::<NodeRecord>(&key))?;
    Ok(Json(detail))
}

/// Deletes a node, its function links and every placement of it.
///
/// `DELETE /nodes/{key}`
pub async fn delete_node(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut service = state.service.lock().await;
    service.delete_node(&parse_ref::<NodeRecord>(&key))?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// `GET /nodes/{key}/compose`
pub async fn compose_node(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<NodeView>, ApiError> {
    let mut service = state.service.lock().await;
    let view = service.compose_node(&parse_ref::<NodeRecord>(&key))?;
    Ok(Json(view))
}
