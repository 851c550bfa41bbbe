//! Dependents-first deletion.
//!
//! The store refuses to delete a row something still points at, so every
//! owner deletion here first removes what it owns, in a fixed order:
//!
//! 1. link arguments, then the function-node link
//! 2. function parameters, then the function
//! 3. global variable arguments, then the variable, then the program
//! 4. node-graph children (post-order), then the placement
//! 5. libraries, then the program
//!
//! Functions in this module expect to run inside an atomic unit opened by the
//! caller; a failure part way through leaves the rollback to that unit.

use std::collections::BTreeSet;

use petgraph::graphmap::DiGraphMap;
use petgraph::visit::DfsPostOrder;

use gm_core::*;
use gm_storage::{CatalogStore, FunctionNodeFilter, NodeGraphFilter, ProgramGraphFilter};

use super::CatalogError;

/// Builds the placement forest of one graph, edges pointing parent to child.
fn placement_tree<S: CatalogStore>(
    store: &S,
    graph: GraphId,
) -> Result<DiGraphMap<NodeGraphId, ()>, CatalogError> {
    let mut tree = DiGraphMap::new();
    for placement in store.list_node_graphs(&NodeGraphFilter::in_graph(graph))? {
        tree.add_node(placement.id);
        if let Some(parent) = placement.parent_id {
            tree.add_edge(parent, placement.id, ());
        }
    }
    Ok(tree)
}

/// Placement ids of the subtree rooted at `root`, children before parents.
pub fn subtree_post_order<S: CatalogStore>(
    store: &S,
    root: &NodeGraphRecord,
) -> Result<Vec<NodeGraphId>, CatalogError> {
    let tree = placement_tree(store, root.graph_id)?;
    let mut order = Vec::new();
    let mut dfs = DfsPostOrder::new(&tree, root.id);
    while let Some(id) = dfs.next(&tree) {
        order.push(id);
    }
    Ok(order)
}

/// Removes a placement and everything below it. Returns the number of
/// placements removed.
pub fn remove_placement_subtree<S: CatalogStore>(
    store: &mut S,
    root: &NodeGraphRecord,
) -> Result<usize, CatalogError> {
    let order = subtree_post_order(store, root)?;
    for id in &order {
        tracing::debug!("removing node_graph {}", id);
        store.delete_node_graph(*id)?;
    }
    Ok(order.len())
}

/// Removes each placement with its subtree, skipping placements an earlier
/// subtree already took. Returns the number of placements removed.
pub fn remove_placements<S: CatalogStore>(
    store: &mut S,
    placements: &[NodeGraphRecord],
) -> Result<usize, CatalogError> {
    let mut removed = 0;
    let mut gone = BTreeSet::new();
    for placement in placements {
        if gone.contains(&placement.id) {
            continue;
        }
        let order = subtree_post_order(store, placement)?;
        for id in &order {
            store.delete_node_graph(*id)?;
        }
        removed += order.len();
        gone.extend(order);
    }
    Ok(removed)
}

/// Removes a function-node link and its arguments.
pub fn remove_function_node<S: CatalogStore>(
    store: &mut S,
    link: FunctionNodeId,
) -> Result<(), CatalogError> {
    let args = store.delete_function_node_args(link)?;
    tracing::debug!("removed {} arg(s) of function_node {}", args, link);
    store.delete_function_node(link)?;
    Ok(())
}

fn remove_function_nodes<S: CatalogStore>(
    store: &mut S,
    filter: &FunctionNodeFilter,
) -> Result<usize, CatalogError> {
    let links = store.list_function_nodes(filter)?;
    for link in &links {
        remove_function_node(store, link.id)?;
    }
    Ok(links.len())
}

pub fn delete_function<S: CatalogStore>(
    store: &mut S,
    function: FunctionId,
) -> Result<(), CatalogError> {
    let links = remove_function_nodes(
        store,
        &FunctionNodeFilter {
            function: Some(function),
            node: None,
        },
    )?;
    let params = store.delete_function_params(function)?;
    store.delete_function(function)?;
    tracing::debug!(
        "function {} removed with {} link(s) and {} param(s)",
        function,
        links,
        params
    );
    Ok(())
}

pub fn delete_node<S: CatalogStore>(store: &mut S, node: NodeId) -> Result<(), CatalogError> {
    remove_function_nodes(
        store,
        &FunctionNodeFilter {
            function: None,
            node: Some(node),
        },
    )?;
    let placements = store.list_node_graphs(&NodeGraphFilter {
        node: Some(node),
        ..Default::default()
    })?;
    let removed = remove_placements(store, &placements)?;
    store.delete_node(node)?;
    tracing::debug!("node {} removed with {} placement(s)", node, removed);
    Ok(())
}

pub fn delete_graph<S: CatalogStore>(store: &mut S, graph: GraphId) -> Result<(), CatalogError> {
    let roots = store.list_node_graphs(&NodeGraphFilter {
        graph: Some(graph),
        roots_only: true,
        ..Default::default()
    })?;
    remove_placements(store, &roots)?;
    // Anything left has no path to a root.
    let stray = store.list_node_graphs(&NodeGraphFilter::in_graph(graph))?;
    remove_placements(store, &stray)?;

    for link in store.list_program_graphs(&ProgramGraphFilter {
        program: None,
        graph: Some(graph),
    })? {
        store.delete_program_graph(link.id)?;
    }
    store.delete_graph(graph)?;
    Ok(())
}

pub fn delete_global_var<S: CatalogStore>(
    store: &mut S,
    var: GlobalVarId,
) -> Result<(), CatalogError> {
    store.delete_global_var_args(var)?;
    store.delete_global_var(var)?;
    Ok(())
}

pub fn delete_program<S: CatalogStore>(
    store: &mut S,
    program: ProgramId,
) -> Result<(), CatalogError> {
    for link in store.list_program_graphs(&ProgramGraphFilter {
        program: Some(program),
        graph: None,
    })? {
        store.delete_program_graph(link.id)?;
    }
    for library in store.list_libraries(program)? {
        store.delete_library(library.id)?;
    }
    for var in store.list_global_vars(program)? {
        delete_global_var(store, var.id)?;
    }
    store.delete_program(program)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::functions::CreateFunctionRequest;
    use crate::service::CatalogService;
    use gm_storage::{InMemoryStore, StorageError};

    fn node(store: &mut InMemoryStore, name: &str) -> NodeId {
        store
            .insert_node(&NewNode {
                name: name.into(),
                node_type: NodeType::PopulationNode,
                gene_type: "int".into(),
            })
            .unwrap()
    }

    fn place(
        store: &mut InMemoryStore,
        name: &str,
        node: NodeId,
        graph: GraphId,
        parent: Option<NodeGraphId>,
    ) -> NodeGraphId {
        store
            .insert_node_graph(&NewNodeGraph {
                name: name.into(),
                node_id: node,
                graph_id: graph,
                parent_id: parent,
            })
            .unwrap()
    }

    /// g: a -> b -> c, a -> d
    fn chain() -> (InMemoryStore, GraphId, [NodeGraphId; 4]) {
        let mut store = InMemoryStore::new();
        let g = store.insert_graph(&NewGraph { name: "g".into() }).unwrap();
        let n = node(&mut store, "n");
        let a = place(&mut store, "a", n, g, None);
        let b = place(&mut store, "b", n, g, Some(a));
        let c = place(&mut store, "c", n, g, Some(b));
        let d = place(&mut store, "d", n, g, Some(a));
        (store, g, [a, b, c, d])
    }

    #[test]
    fn post_order_visits_children_first() {
        let (store, _, [a, b, c, d]) = chain();
        let root = store.get_node_graph(a).unwrap();
        let order = subtree_post_order(&store, &root).unwrap();
        assert_eq!(order.len(), 4);
        let pos = |id| order.iter().position(|x| *x == id).unwrap();
        assert!(pos(c) < pos(b));
        assert!(pos(b) < pos(a));
        assert!(pos(d) < pos(a));
        assert_eq!(order.last(), Some(&a));
    }

    #[test]
    fn removing_inner_placement_keeps_siblings() {
        let (mut store, g, [a, b, _, d]) = chain();
        let inner = store.get_node_graph(b).unwrap();
        assert_eq!(remove_placement_subtree(&mut store, &inner).unwrap(), 2);
        let left: Vec<NodeGraphId> = store
            .list_node_graphs(&NodeGraphFilter::in_graph(g))
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(left, vec![a, d]);
    }

    #[test]
    fn deleting_graph_clears_tree_and_links() {
        let (mut store, g, _) = chain();
        let p = store.insert_program(&NewProgram { name: "p".into() }).unwrap();
        store.insert_program_graph(p, g).unwrap();

        delete_graph(&mut store, g).unwrap();

        assert!(store.list_node_graphs(&NodeGraphFilter::default()).unwrap().is_empty());
        assert!(store
            .list_program_graphs(&ProgramGraphFilter::default())
            .unwrap()
            .is_empty());
        assert!(store.get_program(p).is_ok());
    }

    #[test]
    fn deleting_node_removes_subtrees_it_roots() {
        let mut store = InMemoryStore::new();
        let g = store.insert_graph(&NewGraph { name: "g".into() }).unwrap();
        let top = node(&mut store, "top");
        let leaf = node(&mut store, "leaf");
        let a = place(&mut store, "a", top, g, None);
        place(&mut store, "b", leaf, g, Some(a));

        delete_node(&mut store, top).unwrap();

        assert!(store.list_node_graphs(&NodeGraphFilter::default()).unwrap().is_empty());
        assert!(store.get_node(leaf).is_ok());
    }

    fn delete_function_leaves_no_orphans<S: CatalogStore>(mut svc: CatalogService<S>) {
        let created = svc
            .create_function(&CreateFunctionRequest {
                function: NewFunction {
                    name: "mut".into(),
                    function_type: FunctionType::Mutation,
                    gene_type: "int".into(),
                    code: String::new(),
                },
                params: ["rate", "seed"]
                    .iter()
                    .map(|p| NewFunctionParam {
                        name: p.to_string(),
                        param_type: "int".into(),
                        is_const: false,
                        is_ref: false,
                    })
                    .collect(),
            })
            .unwrap();
        svc.create_node(&NewNode {
            name: "n".into(),
            node_type: NodeType::UnaryNode,
            gene_type: "int".into(),
        })
        .unwrap();
        let link = svc
            .attach_function_node(&"mut".into(), &"n".into(), &["0.1".to_string(), "7".to_string()])
            .unwrap();

        svc.delete_function(&EntityRef::id(created.id)).unwrap();

        let store = svc.store();
        assert!(store.list_function_params(created.id).unwrap().is_empty());
        assert!(store.list_function_node_args(link).unwrap().is_empty());
        assert!(store
            .list_function_nodes(&FunctionNodeFilter::default())
            .unwrap()
            .is_empty());
        assert!(matches!(
            store.get_function(created.id),
            Err(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn deleting_function_leaves_no_orphans_in_memory() {
        delete_function_leaves_no_orphans(CatalogService::in_memory());
    }

    #[test]
    fn deleting_function_leaves_no_orphans_in_sqlite() {
        delete_function_leaves_no_orphans(CatalogService::sqlite_in_memory().unwrap());
    }
}
