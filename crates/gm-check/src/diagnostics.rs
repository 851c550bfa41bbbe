//! Rule violations with enough context to explain the rejection.
//!
//! [`RuleViolation`] names the offending entity kind and identifying value
//! for every rule. [`ViolationKind`] folds the variants into the two error
//! kinds callers react to.

use gm_core::{EntityKind, FunctionType, NodeType};
use serde::{Deserialize, Serialize};

/// How a violation is reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A uniqueness or exclusivity rule was violated.
    AlreadyExists,
    /// A type, arity or tree-structure rule was violated.
    Validation,
}

/// A rejected mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleViolation {
    /// Another entity of the same kind already carries this name.
    #[error("{kind} '{name}' already exists")]
    DuplicateName { kind: EntityKind, name: String },

    /// Names inside a bulk insert collide with each other or with rows the
    /// owner already has.
    #[error("{kind} names already used in {owner}: {names:?}")]
    DuplicateBatchNames {
        kind: EntityKind,
        owner: String,
        names: Vec<String>,
    },

    /// Function and node disagree on gene type.
    #[error(
        "gene type mismatch: function '{function}' is '{function_gene_type}', node '{node}' is '{node_gene_type}'"
    )]
    GeneTypeMismatch {
        function: String,
        function_gene_type: String,
        node: String,
        node_gene_type: String,
    },

    /// The node already hosts a function with this role.
    #[error("node '{node}' already has a '{function_type}' function")]
    RoleOccupied {
        node: String,
        function_type: FunctionType,
    },

    /// The role may only be hosted by one node kind.
    #[error("'{function_type}' functions attach only to {required} nodes, node '{node}' is {actual}")]
    RoleRequiresNodeType {
        function_type: FunctionType,
        required: NodeType,
        node: String,
        actual: NodeType,
    },

    /// Argument count differs from the function's parameter count.
    #[error("function '{function}' takes {expected} argument(s), got {actual}")]
    ArityMismatch {
        function: String,
        expected: usize,
        actual: usize,
    },

    /// The link already has its arguments.
    #[error("function_node {link} already has arguments")]
    ArgsAlreadyBound { link: String },

    /// Links of the function carry arguments sized to the current parameters.
    #[error("function '{function}' has arguments bound on function_node(s) {links:?}")]
    ParamsInUse { function: String, links: Vec<String> },

    /// The graph already has a root placement.
    #[error("graph '{graph}' already has a root node_graph '{root}'")]
    RootAlreadyExists { graph: String, root: String },

    /// The requested parent placement lives in another graph.
    #[error("parent node_graph '{parent}' is not in graph '{graph}'")]
    ParentOutsideGraph { parent: String, graph: String },

    /// A placement with this name already exists in the graph.
    #[error("node_graph '{name}' already exists in graph '{graph}'")]
    DuplicateTreeName { graph: String, name: String },

    /// A link between the two entities already exists.
    #[error("{kind} link {key} already exists")]
    LinkExists { kind: EntityKind, key: String },

    /// A filtered bulk operation was called without any filter.
    #[error("{kind}: at least one filter is required")]
    MissingFilter { kind: EntityKind },
}

impl RuleViolation {
    pub fn kind(&self) -> ViolationKind {
        match self {
            RuleViolation::DuplicateName { .. }
            | RuleViolation::DuplicateBatchNames { .. }
            | RuleViolation::RoleOccupied { .. }
            | RuleViolation::ArgsAlreadyBound { .. }
            | RuleViolation::RootAlreadyExists { .. }
            | RuleViolation::DuplicateTreeName { .. }
            | RuleViolation::LinkExists { .. } => ViolationKind::AlreadyExists,
            RuleViolation::GeneTypeMismatch { .. }
            | RuleViolation::RoleRequiresNodeType { .. }
            | RuleViolation::ArityMismatch { .. }
            | RuleViolation::ParamsInUse { .. }
            | RuleViolation::ParentOutsideGraph { .. }
            | RuleViolation::MissingFilter { .. } => ViolationKind::Validation,
        }
    }

    /// The kind of entity whose mutation was rejected.
    pub fn entity_kind(&self) -> EntityKind {
        match self {
            RuleViolation::DuplicateName { kind, .. }
            | RuleViolation::DuplicateBatchNames { kind, .. }
            | RuleViolation::LinkExists { kind, .. }
            | RuleViolation::MissingFilter { kind } => *kind,
            RuleViolation::GeneTypeMismatch { .. }
            | RuleViolation::RoleOccupied { .. }
            | RuleViolation::RoleRequiresNodeType { .. } => EntityKind::FunctionNode,
            RuleViolation::ArityMismatch { .. } | RuleViolation::ArgsAlreadyBound { .. } => {
                EntityKind::FunctionNodeArg
            }
            RuleViolation::ParamsInUse { .. } => EntityKind::FunctionParam,
            RuleViolation::RootAlreadyExists { .. }
            | RuleViolation::ParentOutsideGraph { .. }
            | RuleViolation::DuplicateTreeName { .. } => EntityKind::NodeGraph,
        }
    }

    /// The identifying value of the rejected entity.
    pub fn key(&self) -> String {
        match self {
            RuleViolation::DuplicateName { name, .. } => name.clone(),
            RuleViolation::DuplicateBatchNames { names, .. } => names.join(","),
            RuleViolation::GeneTypeMismatch { function, node, .. } => {
                format!("{}->{}", function, node)
            }
            RuleViolation::RoleOccupied { node, .. }
            | RuleViolation::RoleRequiresNodeType { node, .. } => node.clone(),
            RuleViolation::ArityMismatch { function, .. }
            | RuleViolation::ParamsInUse { function, .. } => function.clone(),
            RuleViolation::ArgsAlreadyBound { link } => link.clone(),
            RuleViolation::RootAlreadyExists { graph, .. } => graph.clone(),
            RuleViolation::ParentOutsideGraph { parent, .. } => parent.clone(),
            RuleViolation::DuplicateTreeName { name, .. } => name.clone(),
            RuleViolation::LinkExists { key, .. } => key.clone(),
            RuleViolation::MissingFilter { kind } => kind.to_string(),
        }
    }
}
