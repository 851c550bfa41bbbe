//! Graph handlers (create, get, list, delete, compose).

use axum::extract::{Path, Query, State};
use axum::Json;
use gm_core::{GraphId, GraphRecord, NewGraph};

use crate::error::ApiError;
use crate::schema::common::{parse_ref, CreatedResponse};
use crate::schema::compose::GraphView;
use crate::schema::graphs::{GraphDetail, GraphListParams, GraphListResponse};
use crate::state::AppState;

/// `GET /graphs?program=&node=&node_graph=`
pub async fn list_graphs(
    State(state): State<AppState>,
    Query(params): Query<GraphListParams>,
) -> Result<Json<GraphListResponse>, ApiError> {
    let mut service = state.service.lock().await;
    let graphs = service.list_graphs(&params.into_query())?;
    Ok(Json(GraphListResponse { graphs }))
}

/// `POST /graphs`
pub async fn create_graph(
    State(state): State<AppState>,
    Json(req): Json<NewGraph>,
) -> Result<Json<CreatedResponse<GraphId>>, ApiError> {
    let mut service = state.service.lock().await;
    let id = service.create_graph(&req)?;
    Ok(Json(CreatedResponse { id }))
}

/// `GET /graphs/{key}`
pub async fn get_graph(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GraphDetail>, ApiError> {
    let mut service = state.service.lock().await;
    let detail = service.get_graph(&parse_ref::<GraphRecord>(&key))?;
    Ok(Json(detail))
}

/// Deletes a graph with its placement tree and program links.
///
/// `DELETE /graphs/{key}`
pub async fn delete_graph(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut service = state.service.lock().await;
    service.delete_graph(&parse_ref::<GraphRecord>(&key))?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// `GET /graphs/{key}/compose`
pub async fn compose_graph(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GraphView>, ApiError> {
    let mut service = state.service.lock().await;
    let view = service.compose_graph(&parse_ref::<GraphRecord>(&key))?;
    Ok(Json(view))
}
