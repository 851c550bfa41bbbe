//! Program, library and global variable request/response types.

use gm_core::{
    GlobalVarId, GraphId, LibraryId, LibraryRecord, NewGlobalVar, NewLibrary, ProgramId,
    ProgramRecord,
};
use serde::{Deserialize, Serialize};

use super::common::parse_opt_ref;
use crate::service::ProgramQuery;

/// A global variable together with its constructor arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalVarPayload {
    #[serde(flatten)]
    pub var: NewGlobalVar,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Request to create a program, optionally with its libraries and globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProgramRequest {
    pub name: String,
    #[serde(default)]
    pub libraries: Vec<NewLibrary>,
    #[serde(default)]
    pub global_vars: Vec<GlobalVarPayload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateProgramResponse {
    pub id: ProgramId,
    pub library_ids: Vec<LibraryId>,
    pub global_var_ids: Vec<GlobalVarId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostLibrariesRequest {
    pub libraries: Vec<NewLibrary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostGlobalVarsRequest {
    pub global_vars: Vec<GlobalVarPayload>,
}

/// Query string for `GET /programs`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgramListParams {
    /// Only programs linked to this graph (id or name).
    pub graph: Option<String>,
}

impl ProgramListParams {
    pub fn into_query(self) -> ProgramQuery {
        ProgramQuery {
            graph: parse_opt_ref(self.graph.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgramListResponse {
    pub programs: Vec<ProgramRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LibraryListResponse {
    pub libraries: Vec<LibraryRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GlobalVarListResponse {
    pub global_vars: Vec<GlobalVarDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgramDetail {
    pub id: ProgramId,
    pub name: String,
    pub library_ids: Vec<LibraryId>,
    pub global_var_ids: Vec<GlobalVarId>,
    pub graph_ids: Vec<GraphId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GlobalVarDetail {
    pub id: GlobalVarId,
    pub program_id: ProgramId,
    pub name: String,
    #[serde(rename = "type")]
    pub var_type: String,
    pub is_const: bool,
    pub args: Vec<String>,
}
