//! Program handlers, plus the libraries and global variables programs own.

use axum::extract::{Path, Query, State};
use axum::Json;
use gm_core::{GlobalVarId, LibraryId, ProgramRecord};

use crate::error::ApiError;
use crate::schema::common::{parse_ref, CreatedManyResponse};
use crate::schema::compose::ProgramView;
use crate::schema::programs::{
    CreateProgramRequest, CreateProgramResponse, GlobalVarDetail, GlobalVarListResponse,
    LibraryListResponse, PostGlobalVarsRequest, PostLibrariesRequest, ProgramDetail,
    ProgramListParams, ProgramListResponse,
};
use crate::state::AppState;

/// `GET /programs?graph=`
pub async fn list_programs(
    State(state): State<AppState>,
    Query(params): Query<ProgramListParams>,
) -> Result<Json<ProgramListResponse>, ApiError> {
    let mut service = state.service.lock().await;
    let programs = service.list_programs(&params.into_query())?;
    Ok(Json(ProgramListResponse { programs }))
}

/// Creates a program, optionally with libraries and global variables.
///
/// `POST /programs`
pub async fn create_program(
    State(state): State<AppState>,
    Json(req): Json<CreateProgramRequest>,
) -> Result<Json<CreateProgramResponse>, ApiError> {
    let mut service = state.service.lock().await;
    let response = service.create_program(&req)?;
    Ok(Json(response))
}

/// `GET /programs/{key}`
pub async fn get_program(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ProgramDetail>, ApiError> {
    let mut service = state.service.lock().await;
    let detail = service.get_program(&parse_ref::<ProgramRecord>(&key))?;
    Ok(Json(detail))
}

/// Deletes a program with its graph links, libraries and global variables.
///
/// `DELETE /programs/{key}`
pub async fn delete_program(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut service = state.service.lock().await;
    service.delete_program(&parse_ref::<ProgramRecord>(&key))?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// `GET /programs/{key}/compose`
pub async fn compose_program(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ProgramView>, ApiError> {
    let mut service = state.service.lock().await;
    let view = service.compose_program(&parse_ref::<ProgramRecord>(&key))?;
    Ok(Json(view))
}

/// `GET /programs/{key}/libraries`
pub async fn list_libraries(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<LibraryListResponse>, ApiError> {
    let mut service = state.service.lock().await;
    let libraries = service.list_libraries(&parse_ref::<ProgramRecord>(&key))?;
    Ok(Json(LibraryListResponse { libraries }))
}

/// `POST /programs/{key}/libraries`
pub async fn post_libraries(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<PostLibrariesRequest>,
) -> Result<Json<CreatedManyResponse<LibraryId>>, ApiError> {
    let mut service = state.service.lock().await;
    let ids = service.post_libraries(&parse_ref::<ProgramRecord>(&key), &req.libraries)?;
    Ok(Json(CreatedManyResponse { ids }))
}

/// `DELETE /libraries/{id}`
pub async fn delete_library(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut service = state.service.lock().await;
    service.delete_library(LibraryId(id))?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// `GET /programs/{key}/global-vars`
pub async fn list_global_vars(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GlobalVarListResponse>, ApiError> {
    let mut service = state.service.lock().await;
    let global_vars = service.list_global_vars(&parse_ref::<ProgramRecord>(&key))?;
    Ok(Json(GlobalVarListResponse { global_vars }))
}

/// `POST /programs/{key}/global-vars`
pub async fn post_global_vars(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<PostGlobalVarsRequest>,
) -> Result<Json<CreatedManyResponse<GlobalVarId>>, ApiError> {
    let mut service = state.service.lock().await;
    let ids = service.post_global_vars(&parse_ref::<ProgramRecord>(&key), &req.global_vars)?;
    Ok(Json(CreatedManyResponse { ids }))
}

/// `GET /global-vars/{id}`
pub async fn get_global_var(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<GlobalVarDetail>, ApiError> {
    let mut service = state.service.lock().await;
    let detail = service.get_global_var(GlobalVarId(id))?;
    Ok(Json(detail))
}

/// `DELETE /global-vars/{id}`
pub async fn delete_global_var(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut service = state.service.lock().await;
    service.delete_global_var(GlobalVarId(id))?;
    Ok(Json(serde_json::json!({ "success": true })))
}
