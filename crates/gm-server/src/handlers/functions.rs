//! Function handlers (create, get, list, delete, parameters).

use axum::extract::{Path, Query, State};
use axum::Json;
use gm_core::FunctionRecord;

use crate::error::ApiError;
use crate::schema::common::{parse_ref, DeleteResponse};
use crate::schema::functions::{
    CreateFunctionRequest, CreateFunctionResponse, FunctionDetail, FunctionListParams,
    FunctionListResponse, ParamListResponse, PostParamsRequest, PostParamsResponse,
};
use crate::state::AppState;

/// Lists functions matching the query filters.
///
/// `GET /functions?type=&gene_type=&node=`
pub async fn list_functions(
    State(state): State<AppState>,
    Query(params): Query<FunctionListParams>,
) -> Result<Json<FunctionListResponse>, ApiError> {
    let mut service = state.service.lock().await;
    let functions = service.list_functions(&params.into_query())?;
    Ok(Json(FunctionListResponse { functions }))
}

/// Creates a function together with its parameters.
///
/// `POST /functions`
pub async fn create_function(
    State(state): State<AppState>,
    Json(req): Json<CreateFunctionRequest>,
) -> Result<Json<CreateFunctionResponse>, ApiError> {
    let mut service = state.service.lock().await;
    let response = service.create_function(&req)?;
    Ok(Json(response))
}

/// `GET /functions/{key}`
pub async fn get_function(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<FunctionDetail>, ApiError> {
    let mut service = state.service.lock().await;
    let detail = service.get_function(&parse_ref::<FunctionRecord>(&key))?;
    Ok(Json(detail))
}

/// Deletes a function with its links, link arguments and parameters.
///
/// `DELETE /functions/{key}`
pub async fn delete_function(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut service = state.service.lock().await;
    service.delete_function(&parse_ref::<FunctionRecord>(&key))?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// `GET /functions/{key}/params`
pub async fn list_params(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ParamListResponse>, ApiError> {
    let mut service = state.service.lock().await;
    let params = service.list_function_params(&parse_ref::<FunctionRecord>(&key))?;
    Ok(Json(ParamListResponse { params }))
}

/// Appends parameters; the whole batch is rejected on any name collision.
///
/// `POST /functions/{key}/params`
pub async fn post_params(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<PostParamsRequest>,
) -> Result<Json<PostParamsResponse>, ApiError> {
    let mut service = state.service.lock().await;
    let param_ids =
        service.post_function_params(&parse_ref::<FunctionRecord>(&key), &req.params)?;
    Ok(Json(PostParamsResponse { param_ids }))
}

/// Removes all parameters of a function; refused while any of its links has
/// arguments bound.
///
/// `DELETE /functions/{key}/params`
pub async fn delete_params(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let mut service = state.service.lock().await;
    let removed = service.delete_function_params(&parse_ref::<FunctionRecord>(&key))?;
    Ok(Json(DeleteResponse::removed(removed)))
}
