//! Plain data records for stored rows, and the payloads used to create them.
//!
//! Records carry their own id plus the ids of the rows they belong to; they
//! never hold back-references. Relationships are answered by queries against
//! the store, not by walking object pointers.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::id::*;
use crate::types::{EntityKind, FunctionType, NodeType};

/// A stored row with a typed identifier.
pub trait Entity: Clone + fmt::Debug {
    type Id: Copy + Eq + Ord + Hash + fmt::Debug + fmt::Display + From<i64> + Into<i64>;

    const KIND: EntityKind;

    fn id(&self) -> Self::Id;
}

macro_rules! impl_entity {
    ($($record:ident => $id:ident, $kind:ident;)+) => {
        $(
            impl Entity for $record {
                type Id = $id;
                const KIND: EntityKind = EntityKind::$kind;

                fn id(&self) -> $id {
                    self.id
                }
            }
        )+
    };
}

// ---------------------------------------------------------------------------
// Top-level named entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramRecord {
    pub id: ProgramId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphRecord {
    pub id: GraphId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub gene_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub id: FunctionId,
    pub name: String,
    #[serde(rename = "type")]
    pub function_type: FunctionType,
    pub gene_type: String,
    /// Opaque source code of the function body.
    pub code: String,
}

// ---------------------------------------------------------------------------
// Owned rows
// ---------------------------------------------------------------------------

/// A formal parameter. Parameter order is creation order (ascending id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionParamRecord {
    pub id: FunctionParamId,
    pub function_id: FunctionId,
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    pub is_const: bool,
    pub is_ref: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalVarRecord {
    pub id: GlobalVarId,
    pub program_id: ProgramId,
    pub name: String,
    #[serde(rename = "type")]
    pub var_type: String,
    pub is_const: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalVarArgRecord {
    pub id: GlobalVarArgId,
    pub global_var_id: GlobalVarId,
    pub arg: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryRecord {
    pub id: LibraryId,
    pub program_id: ProgramId,
    pub name: String,
    /// `true` for a system include (`<...>`), `false` for a local one.
    pub is_stl: bool,
}

// ---------------------------------------------------------------------------
// Link rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionNodeRecord {
    pub id: FunctionNodeId,
    pub function_id: FunctionId,
    pub node_id: NodeId,
}

/// Positional argument of a function-node link. Argument order is creation
/// order (ascending id) and matches parameter order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionNodeArgRecord {
    pub id: FunctionNodeArgId,
    pub function_node_id: FunctionNodeId,
    pub arg: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramGraphRecord {
    pub id: ProgramGraphId,
    pub program_id: ProgramId,
    pub graph_id: GraphId,
}

/// Placement of a node inside a graph's tree.
///
/// `parent_id` is `None` only for the graph's root placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeGraphRecord {
    pub id: NodeGraphId,
    pub name: String,
    pub node_id: NodeId,
    pub graph_id: GraphId,
    pub parent_id: Option<NodeGraphId>,
}

impl NodeGraphRecord {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl_entity! {
    ProgramRecord => ProgramId, Program;
    GraphRecord => GraphId, Graph;
    NodeRecord => NodeId, Node;
    FunctionRecord => FunctionId, Function;
    FunctionParamRecord => FunctionParamId, FunctionParam;
    GlobalVarRecord => GlobalVarId, GlobalVar;
    GlobalVarArgRecord => GlobalVarArgId, GlobalVarArg;
    LibraryRecord => LibraryId, Library;
    FunctionNodeRecord => FunctionNodeId, FunctionNode;
    FunctionNodeArgRecord => FunctionNodeArgId, FunctionNodeArg;
    ProgramGraphRecord => ProgramGraphId, ProgramGraph;
    NodeGraphRecord => NodeGraphId, NodeGraph;
}

// ---------------------------------------------------------------------------
// Creation payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProgram {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGraph {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNode {
    pub name: String,
    #[serde(rename = "type", default)]
    pub node_type: NodeType,
    pub gene_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFunction {
    pub name: String,
    #[serde(rename = "type", default)]
    pub function_type: FunctionType,
    pub gene_type: String,
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFunctionParam {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    #[serde(default)]
    pub is_const: bool,
    #[serde(default)]
    pub is_ref: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGlobalVar {
    pub name: String,
    #[serde(rename = "type")]
    pub var_type: String,
    #[serde(default)]
    pub is_const: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLibrary {
    pub name: String,
    #[serde(default)]
    pub is_stl: bool,
}

/// Row payload for a node placement; references are already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNodeGraph {
    pub name: String,
    pub node_id: NodeId,
    pub graph_id: GraphId,
    pub parent_id: Option<NodeGraphId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_payload_defaults_to_population_node() {
        let node: NewNode =
            serde_json::from_str(r#"{"name": "n1", "gene_type": "int"}"#).unwrap();
        assert_eq!(node.node_type, NodeType::PopulationNode);
    }

    #[test]
    fn function_payload_reads_type_field() {
        let f: NewFunction = serde_json::from_str(
            r#"{"name": "f1", "type": "pooling_populations", "gene_type": "int", "code": ""}"#,
        )
        .unwrap();
        assert_eq!(f.function_type, FunctionType::PoolingPopulations);
    }

    #[test]
    fn records_expose_kind_and_id() {
        let rec = NodeGraphRecord {
            id: NodeGraphId(4),
            name: "root".into(),
            node_id: NodeId(1),
            graph_id: GraphId(2),
            parent_id: None,
        };
        assert_eq!(NodeGraphRecord::KIND, EntityKind::NodeGraph);
        assert_eq!(rec.id(), NodeGraphId(4));
        assert!(rec.is_root());
    }
}
