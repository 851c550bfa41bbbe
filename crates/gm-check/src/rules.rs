//! The integrity rules, one function per rule.
//!
//! Callers pass the records and facts a rule needs. A rule either accepts or
//! returns the [`RuleViolation`] describing why the mutation must not happen.

use std::collections::HashSet;

use gm_core::{
    EntityKind, FunctionNodeRecord, FunctionRecord, FunctionType, GraphRecord, NodeGraphRecord,
    NodeRecord, NodeType,
};

use crate::diagnostics::RuleViolation;

/// The only node kind allowed to host a function of this role, if restricted.
pub fn required_node_type(function_type: FunctionType) -> Option<NodeType> {
    match function_type {
        FunctionType::PoolingPopulations => Some(NodeType::KNode),
        FunctionType::StartPopulation => Some(NodeType::PopulationNode),
        _ => None,
    }
}

/// Rejects a new named entity when `existing` already holds the name.
pub fn check_name_free<T>(
    kind: EntityKind,
    name: &str,
    existing: Option<&T>,
) -> Result<(), RuleViolation> {
    match existing {
        Some(_) => Err(RuleViolation::DuplicateName {
            kind,
            name: name.to_string(),
        }),
        None => Ok(()),
    }
}

/// Rejects a whole batch when any name repeats inside it or collides with a
/// name the owner already has.
///
/// Reports every offending name, in batch order, without duplicates.
pub fn check_batch_names<'a>(
    kind: EntityKind,
    owner: &str,
    batch: impl IntoIterator<Item = &'a str>,
    existing: impl IntoIterator<Item = &'a str>,
) -> Result<(), RuleViolation> {
    let mut taken: HashSet<&str> = existing.into_iter().collect();
    let mut reported: HashSet<&str> = HashSet::new();
    let mut collisions = Vec::new();

    for name in batch {
        if !taken.insert(name) && reported.insert(name) {
            collisions.push(name.to_string());
        }
    }

    if collisions.is_empty() {
        Ok(())
    } else {
        Err(RuleViolation::DuplicateBatchNames {
            kind,
            owner: owner.to_string(),
            names: collisions,
        })
    }
}

/// Function and node must share a gene type.
pub fn check_gene_type(function: &FunctionRecord, node: &NodeRecord) -> Result<(), RuleViolation> {
    if function.gene_type != node.gene_type {
        return Err(RuleViolation::GeneTypeMismatch {
            function: function.name.clone(),
            function_gene_type: function.gene_type.clone(),
            node: node.name.clone(),
            node_gene_type: node.gene_type.clone(),
        });
    }
    Ok(())
}

/// A node hosts at most one function per role.
///
/// `hosted` are the roles of the functions already attached to the node.
pub fn check_role_free(
    function: &FunctionRecord,
    node: &NodeRecord,
    hosted: &[FunctionType],
) -> Result<(), RuleViolation> {
    if hosted.contains(&function.function_type) {
        return Err(RuleViolation::RoleOccupied {
            node: node.name.clone(),
            function_type: function.function_type,
        });
    }
    Ok(())
}

/// Restricted roles attach only to their node kind.
pub fn check_role_node_type(
    function: &FunctionRecord,
    node: &NodeRecord,
) -> Result<(), RuleViolation> {
    match required_node_type(function.function_type) {
        Some(required) if required != node.node_type => Err(RuleViolation::RoleRequiresNodeType {
            function_type: function.function_type,
            required,
            node: node.name.clone(),
            actual: node.node_type,
        }),
        _ => Ok(()),
    }
}

/// All checks guarding a new function-node link, in reporting order:
/// gene type, role exclusivity, then role-to-node-kind binding.
pub fn check_function_node(
    function: &FunctionRecord,
    node: &NodeRecord,
    hosted: &[FunctionType],
) -> Result<(), RuleViolation> {
    check_gene_type(function, node)?;
    check_role_free(function, node, hosted)?;
    check_role_node_type(function, node)
}

/// One argument per parameter.
pub fn check_arity(
    function: &FunctionRecord,
    param_count: usize,
    arg_count: usize,
) -> Result<(), RuleViolation> {
    if param_count != arg_count {
        return Err(RuleViolation::ArityMismatch {
            function: function.name.clone(),
            expected: param_count,
            actual: arg_count,
        });
    }
    Ok(())
}

/// Arguments are bound once per link.
pub fn check_args_unbound(link: &FunctionNodeRecord, bound: usize) -> Result<(), RuleViolation> {
    if bound > 0 {
        return Err(RuleViolation::ArgsAlreadyBound {
            link: link.id.to_string(),
        });
    }
    Ok(())
}

/// Parameters change only while no link of the function has arguments.
///
/// `bound` are the function's links that carry arguments.
pub fn check_params_unbound(
    function: &FunctionRecord,
    bound: &[FunctionNodeRecord],
) -> Result<(), RuleViolation> {
    if bound.is_empty() {
        return Ok(());
    }
    Err(RuleViolation::ParamsInUse {
        function: function.name.clone(),
        links: bound.iter().map(|link| link.id.to_string()).collect(),
    })
}

/// A graph has a single root placement.
pub fn check_root_free(
    graph: &GraphRecord,
    root: Option<&NodeGraphRecord>,
) -> Result<(), RuleViolation> {
    match root {
        Some(root) => Err(RuleViolation::RootAlreadyExists {
            graph: graph.name.clone(),
            root: root.name.clone(),
        }),
        None => Ok(()),
    }
}

/// A parent placement must belong to the graph the child is placed in.
pub fn check_parent_in_graph(
    parent: &NodeGraphRecord,
    graph: &GraphRecord,
) -> Result<(), RuleViolation> {
    if parent.graph_id != graph.id {
        return Err(RuleViolation::ParentOutsideGraph {
            parent: parent.name.clone(),
            graph: graph.name.clone(),
        });
    }
    Ok(())
}

/// Placement names are unique within a graph.
pub fn check_tree_name_free(
    graph: &GraphRecord,
    name: &str,
    existing: Option<&NodeGraphRecord>,
) -> Result<(), RuleViolation> {
    match existing {
        Some(_) => Err(RuleViolation::DuplicateTreeName {
            graph: graph.name.clone(),
            name: name.to_string(),
        }),
        None => Ok(()),
    }
}

/// Rejects a second link between the same pair.
pub fn check_link_free<T>(
    kind: EntityKind,
    key: impl Into<String>,
    existing: Option<&T>,
) -> Result<(), RuleViolation> {
    match existing {
        Some(_) => Err(RuleViolation::LinkExists {
            kind,
            key: key.into(),
        }),
        None => Ok(()),
    }
}

/// Filtered bulk removals need at least one filter.
pub fn check_has_filter(kind: EntityKind, filters: &[bool]) -> Result<(), RuleViolation> {
    if filters.iter().any(|present| *present) {
        Ok(())
    } else {
        Err(RuleViolation::MissingFilter { kind })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ViolationKind;
    use gm_core::{FunctionId, FunctionNodeId, GraphId, NodeGraphId, NodeId};
    use proptest::prelude::*;

    fn function(name: &str, function_type: FunctionType, gene_type: &str) -> FunctionRecord {
        FunctionRecord {
            id: FunctionId(1),
            name: name.into(),
            function_type,
            gene_type: gene_type.into(),
            code: String::new(),
        }
    }

    fn node(name: &str, node_type: NodeType, gene_type: &str) -> NodeRecord {
        NodeRecord {
            id: NodeId(1),
            name: name.into(),
            node_type,
            gene_type: gene_type.into(),
        }
    }

    fn graph(id: i64, name: &str) -> GraphRecord {
        GraphRecord {
            id: GraphId(id),
            name: name.into(),
        }
    }

    fn placement(id: i64, name: &str, graph_id: i64, parent: Option<i64>) -> NodeGraphRecord {
        NodeGraphRecord {
            id: NodeGraphId(id),
            name: name.into(),
            node_id: NodeId(1),
            graph_id: GraphId(graph_id),
            parent_id: parent.map(NodeGraphId),
        }
    }

    // -----------------------------------------------------------------------
    // Function-node rules
    // -----------------------------------------------------------------------

    #[test]
    fn matching_function_attaches() {
        let f = function("f1", FunctionType::Fitness, "int");
        let n = node("n1", NodeType::PopulationNode, "int");
        assert!(check_function_node(&f, &n, &[]).is_ok());
    }

    #[test]
    fn gene_type_mismatch_is_a_validation_error() {
        let f = function("f1", FunctionType::Fitness, "int");
        let n = node("n1", NodeType::PopulationNode, "float");
        let err = check_function_node(&f, &n, &[]).unwrap_err();
        assert_eq!(err.kind(), ViolationKind::Validation);
        assert!(matches!(err, RuleViolation::GeneTypeMismatch { .. }));
    }

    #[test]
    fn occupied_role_is_already_exists() {
        let f = function("f2", FunctionType::Mutation, "int");
        let n = node("n1", NodeType::UnaryNode, "int");
        let err = check_function_node(&f, &n, &[FunctionType::Fitness, FunctionType::Mutation])
            .unwrap_err();
        assert_eq!(err.kind(), ViolationKind::AlreadyExists);
        assert_eq!(err.entity_kind(), EntityKind::FunctionNode);
    }

    #[test]
    fn pooling_populations_needs_k_node() {
        let f = function("pool", FunctionType::PoolingPopulations, "int");
        for t in NodeType::ALL {
            let result = check_function_node(&f, &node("n", t, "int"), &[]);
            assert_eq!(result.is_ok(), t == NodeType::KNode, "node type {}", t);
        }
    }

    #[test]
    fn start_population_needs_population_node() {
        let f = function("start", FunctionType::StartPopulation, "int");
        for t in NodeType::ALL {
            let result = check_function_node(&f, &node("n", t, "int"), &[]);
            assert_eq!(result.is_ok(), t == NodeType::PopulationNode, "node type {}", t);
        }
    }

    #[test]
    fn gene_type_is_reported_before_role_binding() {
        let f = function("pool", FunctionType::PoolingPopulations, "int");
        let n = node("n", NodeType::UnaryNode, "bool");
        let err = check_function_node(&f, &n, &[]).unwrap_err();
        assert!(matches!(err, RuleViolation::GeneTypeMismatch { .. }));
    }

    // -----------------------------------------------------------------------
    // Arity
    // -----------------------------------------------------------------------

    #[test]
    fn arity_mismatch_names_counts() {
        let f = function("f", FunctionType::Any, "int");
        let err = check_arity(&f, 2, 1).unwrap_err();
        assert_eq!(err.to_string(), "function 'f' takes 2 argument(s), got 1");
        assert_eq!(err.kind(), ViolationKind::Validation);
    }

    #[test]
    fn args_bind_once() {
        let link = FunctionNodeRecord {
            id: FunctionNodeId(3),
            function_id: FunctionId(1),
            node_id: NodeId(1),
        };
        assert!(check_args_unbound(&link, 0).is_ok());
        let err = check_args_unbound(&link, 2).unwrap_err();
        assert_eq!(err.kind(), ViolationKind::AlreadyExists);
    }

    #[test]
    fn params_are_frozen_while_links_hold_args() {
        let f = function("mut", FunctionType::Mutation, "int");
        assert!(check_params_unbound(&f, &[]).is_ok());

        let bound = FunctionNodeRecord {
            id: FunctionNodeId(4),
            function_id: FunctionId(1),
            node_id: NodeId(2),
        };
        let err = check_params_unbound(&f, &[bound]).unwrap_err();
        assert_eq!(err.kind(), ViolationKind::Validation);
        assert_eq!(err.entity_kind(), EntityKind::FunctionParam);
        assert_eq!(err.key(), "mut");
    }

    // -----------------------------------------------------------------------
    // Tree rules
    // -----------------------------------------------------------------------

    #[test]
    fn second_root_is_rejected() {
        let g = graph(1, "g1");
        let root = placement(1, "root", 1, None);
        assert!(check_root_free(&g, None).is_ok());
        let err = check_root_free(&g, Some(&root)).unwrap_err();
        assert_eq!(err.kind(), ViolationKind::AlreadyExists);
        assert_eq!(err.entity_kind(), EntityKind::NodeGraph);
    }

    #[test]
    fn parent_from_another_graph_is_rejected() {
        let parent = placement(1, "root", 2, None);
        assert!(check_parent_in_graph(&parent, &graph(2, "g2")).is_ok());
        let err = check_parent_in_graph(&parent, &graph(1, "g1")).unwrap_err();
        assert_eq!(err.kind(), ViolationKind::Validation);
    }

    #[test]
    fn tree_names_are_unique_per_graph() {
        let g = graph(1, "g1");
        let existing = placement(2, "child", 1, Some(1));
        assert!(check_tree_name_free(&g, "child", None).is_ok());
        assert!(check_tree_name_free(&g, "child", Some(&existing)).is_err());
    }

    // -----------------------------------------------------------------------
    // Names and filters
    // -----------------------------------------------------------------------

    #[test]
    fn batch_collisions_with_existing_rows() {
        let err = check_batch_names(
            EntityKind::Library,
            "program 'p'",
            ["vector", "map"],
            ["map"],
        )
        .unwrap_err();
        assert_eq!(
            err,
            RuleViolation::DuplicateBatchNames {
                kind: EntityKind::Library,
                owner: "program 'p'".into(),
                names: vec!["map".into()],
            }
        );
    }

    #[test]
    fn batch_collisions_inside_the_batch() {
        let err = check_batch_names(
            EntityKind::FunctionParam,
            "function 'f'",
            ["a", "b", "a", "a"],
            std::iter::empty(),
        )
        .unwrap_err();
        assert_eq!(err.key(), "a");
    }

    #[test]
    fn distinct_batch_passes() {
        assert!(check_batch_names(EntityKind::GlobalVar, "p", ["x", "y"], ["z"]).is_ok());
    }

    #[test]
    fn name_and_link_checks() {
        let g = graph(1, "g1");
        assert!(check_name_free::<GraphRecord>(EntityKind::Graph, "g1", None).is_ok());
        let err = check_name_free(EntityKind::Graph, "g1", Some(&g)).unwrap_err();
        assert_eq!(err.to_string(), "graph 'g1' already exists");

        let err = check_link_free(EntityKind::ProgramGraph, "p->g1", Some(&g)).unwrap_err();
        assert_eq!(err.kind(), ViolationKind::AlreadyExists);
    }

    #[test]
    fn filters_are_required() {
        assert!(check_has_filter(EntityKind::FunctionNode, &[false, true]).is_ok());
        let err = check_has_filter(EntityKind::FunctionNode, &[false, false]).unwrap_err();
        assert_eq!(err.kind(), ViolationKind::Validation);
    }

    #[test]
    fn violations_serialize_with_rule_tag() {
        let err = RuleViolation::ArityMismatch {
            function: "f".into(),
            expected: 1,
            actual: 0,
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["rule"], "arity_mismatch");
        assert_eq!(json["expected"], 1);
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    fn any_function_type() -> impl Strategy<Value = FunctionType> {
        proptest::sample::select(FunctionType::ALL.to_vec())
    }

    fn any_node_type() -> impl Strategy<Value = NodeType> {
        proptest::sample::select(NodeType::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn differing_gene_types_never_attach(
            ft in any_function_type(),
            nt in any_node_type(),
            a in "[a-z]{1,8}",
            b in "[a-z]{1,8}",
        ) {
            prop_assume!(a != b);
            let err = check_function_node(&function("f", ft, &a), &node("n", nt, &b), &[]).unwrap_err();
            prop_assert_eq!(err.kind(), ViolationKind::Validation);
        }

        #[test]
        fn same_role_never_attaches_twice(
            ft in any_function_type(),
            nt in any_node_type(),
        ) {
            let result = check_function_node(&function("f", ft, "g"), &node("n", nt, "g"), &[ft]);
            prop_assert_eq!(result.unwrap_err().kind(), ViolationKind::AlreadyExists);
        }

        #[test]
        fn arity_holds_iff_counts_match(params in 0usize..6, args in 0usize..6) {
            let f = function("f", FunctionType::Any, "g");
            prop_assert_eq!(check_arity(&f, params, args).is_ok(), params == args);
        }
    }
}
