//! Enum vocabularies: node kinds, function roles, and entity kinds.
//!
//! Node and function kinds are stored as TEXT, so every variant has a stable
//! spelling shared by serde, [`fmt::Display`] and [`FromStr`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The structural kind of a node inside a genetic-algorithm graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NodeType {
    #[serde(rename = "unary_node")]
    UnaryNode,
    /// A node that pools several incoming populations.
    #[serde(rename = "K_node")]
    KNode,
    /// A node that owns a population.
    #[default]
    #[serde(rename = "population_node")]
    PopulationNode,
}

impl NodeType {
    pub const ALL: [NodeType; 3] = [NodeType::UnaryNode, NodeType::KNode, NodeType::PopulationNode];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::UnaryNode => "unary_node",
            NodeType::KNode => "K_node",
            NodeType::PopulationNode => "population_node",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::UnknownNodeType {
                value: s.to_string(),
            })
    }
}

/// The functional role a function plays inside a node.
///
/// A node hosts at most one function per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionType {
    Fitness,
    StartPopulation,
    Selection,
    ConditionsForStopping,
    PoolingPopulations,
    Mutation,
    Crossingover,
    #[default]
    Any,
    EndNode,
    StartNode,
    NewGenerationLog,
    StartNodeLog,
    EndNodeLog,
}

impl FunctionType {
    pub const ALL: [FunctionType; 13] = [
        FunctionType::Fitness,
        FunctionType::StartPopulation,
        FunctionType::Selection,
        FunctionType::ConditionsForStopping,
        FunctionType::PoolingPopulations,
        FunctionType::Mutation,
        FunctionType::Crossingover,
        FunctionType::Any,
        FunctionType::EndNode,
        FunctionType::StartNode,
        FunctionType::NewGenerationLog,
        FunctionType::StartNodeLog,
        FunctionType::EndNodeLog,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionType::Fitness => "fitness",
            FunctionType::StartPopulation => "start_population",
            FunctionType::Selection => "selection",
            FunctionType::ConditionsForStopping => "conditions_for_stopping",
            FunctionType::PoolingPopulations => "pooling_populations",
            FunctionType::Mutation => "mutation",
            FunctionType::Crossingover => "crossingover",
            FunctionType::Any => "any",
            FunctionType::EndNode => "end_node",
            FunctionType::StartNode => "start_node",
            FunctionType::NewGenerationLog => "new_generation_log",
            FunctionType::StartNodeLog => "start_node_log",
            FunctionType::EndNodeLog => "end_node_log",
        }
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FunctionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FunctionType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::UnknownFunctionType {
                value: s.to_string(),
            })
    }
}

/// Every kind of stored row. Used to label errors and references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Program,
    Graph,
    Node,
    Function,
    FunctionParam,
    FunctionNode,
    FunctionNodeArg,
    GlobalVar,
    GlobalVarArg,
    Library,
    ProgramGraph,
    NodeGraph,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Program => "program",
            EntityKind::Graph => "graph",
            EntityKind::Node => "node",
            EntityKind::Function => "function",
            EntityKind::FunctionParam => "function_param",
            EntityKind::FunctionNode => "function_node",
            EntityKind::FunctionNodeArg => "function_node_arg",
            EntityKind::GlobalVar => "global_var",
            EntityKind::GlobalVarArg => "global_var_arg",
            EntityKind::Library => "library",
            EntityKind::ProgramGraph => "program_graph",
            EntityKind::NodeGraph => "node_graph",
        }
    }

    /// Whether rows of this kind carry a globally unique name.
    pub fn has_unique_name(&self) -> bool {
        matches!(
            self,
            EntityKind::Program | EntityKind::Graph | EntityKind::Node | EntityKind::Function
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_type_spellings_match_serde() {
        for t in NodeType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
            assert_eq!(t.as_str().parse::<NodeType>().unwrap(), t);
        }
    }

    #[test]
    fn function_type_spellings_match_serde() {
        for t in FunctionType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
            assert_eq!(t.as_str().parse::<FunctionType>().unwrap(), t);
        }
    }

    #[test]
    fn k_node_keeps_its_capital_letter() {
        assert_eq!(NodeType::KNode.to_string(), "K_node");
        assert!("k_node".parse::<NodeType>().is_err());
    }

    #[test]
    fn unknown_function_type_is_rejected() {
        let err = "teleport".parse::<FunctionType>().unwrap_err();
        assert!(err.to_string().contains("teleport"));
    }

    #[test]
    fn defaults() {
        assert_eq!(NodeType::default(), NodeType::PopulationNode);
        assert_eq!(FunctionType::default(), FunctionType::Any);
    }

    #[test]
    fn only_top_level_kinds_are_named() {
        assert!(EntityKind::Function.has_unique_name());
        assert!(!EntityKind::NodeGraph.has_unique_name());
        assert!(!EntityKind::Library.has_unique_name());
    }
}
