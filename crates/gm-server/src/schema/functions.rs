//! Function request/response types.

use gm_core::{
    FunctionId, FunctionParamId, FunctionParamRecord, FunctionRecord, FunctionType, NewFunction,
    NewFunctionParam, NodeId,
};
use serde::{Deserialize, Serialize};

use super::common::parse_opt_ref;
use crate::service::FunctionQuery;

/// Request to create a function, optionally together with its parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFunctionRequest {
    #[serde(flatten)]
    pub function: NewFunction,
    /// Parameters in positional order.
    #[serde(default)]
    pub params: Vec<NewFunctionParam>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateFunctionResponse {
    pub id: FunctionId,
    pub param_ids: Vec<FunctionParamId>,
}

/// Bulk parameter post for an existing function.
#[derive(Debug, Clone, Deserialize)]
pub struct PostParamsRequest {
    pub params: Vec<NewFunctionParam>,
}

/// Query string for `GET /functions`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FunctionListParams {
    #[serde(rename = "type")]
    pub function_type: Option<FunctionType>,
    pub gene_type: Option<String>,
    /// Only functions attached to this node (id or name).
    pub node: Option<String>,
}

impl FunctionListParams {
    pub fn into_query(self) -> FunctionQuery {
        FunctionQuery {
            function_type: self.function_type,
            gene_type: self.gene_type,
            node: parse_opt_ref(self.node.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionListResponse {
    pub functions: Vec<FunctionRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParamListResponse {
    pub params: Vec<FunctionParamRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostParamsResponse {
    pub param_ids: Vec<FunctionParamId>,
}

/// A function with its parameters and the nodes hosting it.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionDetail {
    pub id: FunctionId,
    pub name: String,
    #[serde(rename = "type")]
    pub function_type: FunctionType,
    pub gene_type: String,
    pub code: String,
    pub params: Vec<FunctionParamRecord>,
    pub node_ids: Vec<NodeId>,
}
