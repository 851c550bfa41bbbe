//! Links between entities: functions hosted by nodes (with positional
//! arguments), nodes placed in a graph's tree, graphs linked to programs.
//!
//! Every attach resolves its references, runs the integrity rules, and only
//! then inserts the link row.

use gm_check::{
    check_args_unbound, check_arity, check_function_node, check_has_filter, check_link_free,
    check_parent_in_graph, check_root_free, check_tree_name_free,
};
use gm_core::*;
use gm_storage::{
    resolve, resolve_id, CatalogStore, FunctionNodeFilter, NodeGraphFilter, ProgramGraphFilter,
};

use super::{cascade, dangling, CatalogError, CatalogService};

// ---------------------------------------------------------------------------
// Function-node links
// ---------------------------------------------------------------------------

fn attach_function<S: CatalogStore>(
    store: &mut S,
    function: &EntityRef<FunctionRecord>,
    node: &EntityRef<NodeRecord>,
) -> Result<FunctionNodeRecord, CatalogError> {
    let function = resolve(store, function)?;
    let node = resolve(store, node)?;

    let existing = store.list_function_nodes(&FunctionNodeFilter::pair(function.id, node.id))?;
    check_link_free(
        EntityKind::FunctionNode,
        format!("{}/{}", function.name, node.name),
        existing.first(),
    )?;

    let mut hosted = Vec::new();
    for link in store.list_function_nodes(&FunctionNodeFilter {
        function: None,
        node: Some(node.id),
    })? {
        let other = store
            .get_function(link.function_id)
            .map_err(dangling(format!("function_node {}", link.id)))?;
        hosted.push(other.function_type);
    }
    check_function_node(&function, &node, &hosted)?;

    let id = store.insert_function_node(function.id, node.id)?;
    Ok(FunctionNodeRecord {
        id,
        function_id: function.id,
        node_id: node.id,
    })
}

fn attach_args<S: CatalogStore>(
    store: &mut S,
    link: FunctionNodeId,
    args: &[String],
) -> Result<Vec<FunctionNodeArgId>, CatalogError> {
    let link = store.get_function_node(link)?;
    let function = store
        .get_function(link.function_id)
        .map_err(dangling(format!("function_node {}", link.id)))?;

    check_args_unbound(&link, store.list_function_node_args(link.id)?.len())?;
    check_arity(&function, store.list_function_params(function.id)?.len(), args.len())?;

    let mut ids = Vec::with_capacity(args.len());
    for arg in args {
        ids.push(store.insert_function_node_arg(link.id, arg)?);
    }
    Ok(ids)
}

fn find_function_node<S: CatalogStore>(
    store: &S,
    function: &EntityRef<FunctionRecord>,
    node: &EntityRef<NodeRecord>,
) -> Result<FunctionNodeRecord, CatalogError> {
    let function = resolve(store, function)?;
    let node = resolve(store, node)?;
    store
        .list_function_nodes(&FunctionNodeFilter::pair(function.id, node.id))?
        .into_iter()
        .next()
        .ok_or_else(|| {
            CatalogError::not_found(
                EntityKind::FunctionNode,
                format!("{}/{}", function.name, node.name),
            )
        })
}

fn function_node_filter<S: CatalogStore>(
    store: &S,
    function: Option<&EntityRef<FunctionRecord>>,
    node: Option<&EntityRef<NodeRecord>>,
) -> Result<FunctionNodeFilter, CatalogError> {
    Ok(FunctionNodeFilter {
        function: function.map(|f| resolve_id(store, f)).transpose()?,
        node: node.map(|n| resolve_id(store, n)).transpose()?,
    })
}

// ---------------------------------------------------------------------------
// Node placements
// ---------------------------------------------------------------------------

/// Where a new placement hangs: the root slot, or under a parent given by
/// placement id or by placement name within the graph.
fn placement_parent<S: CatalogStore>(
    store: &S,
    graph: &GraphRecord,
    parent: Option<&RefKey>,
) -> Result<Option<NodeGraphId>, CatalogError> {
    match parent {
        None => {
            let roots = store.list_node_graphs(&NodeGraphFilter {
                graph: Some(graph.id),
                roots_only: true,
                ..Default::default()
            })?;
            check_root_free(graph, roots.first())?;
            Ok(None)
        }
        Some(RefKey::Id(raw)) => {
            let parent = store.get_node_graph(NodeGraphId(*raw))?;
            check_parent_in_graph(&parent, graph)?;
            Ok(Some(parent.id))
        }
        Some(RefKey::Name(name)) => {
            let parent = store
                .list_node_graphs(&NodeGraphFilter {
                    graph: Some(graph.id),
                    name: Some(name.clone()),
                    ..Default::default()
                })?
                .into_iter()
                .next()
                .ok_or_else(|| CatalogError::not_found(EntityKind::NodeGraph, name))?;
            Ok(Some(parent.id))
        }
    }
}

fn attach_node_graph<S: CatalogStore>(
    store: &mut S,
    name: &str,
    node: &EntityRef<NodeRecord>,
    graph: &EntityRef<GraphRecord>,
    parent: Option<&RefKey>,
) -> Result<NodeGraphId, CatalogError> {
    let node = resolve(store, node)?;
    let graph = resolve(store, graph)?;
    let parent_id = placement_parent(store, &graph, parent)?;

    let taken = store.list_node_graphs(&NodeGraphFilter {
        graph: Some(graph.id),
        name: Some(name.to_string()),
        ..Default::default()
    })?;
    check_tree_name_free(&graph, name, taken.first())?;

    Ok(store.insert_node_graph(&NewNodeGraph {
        name: name.to_string(),
        node_id: node.id,
        graph_id: graph.id,
        parent_id,
    })?)
}

fn node_graph_filter<S: CatalogStore>(
    store: &S,
    node: Option<&EntityRef<NodeRecord>>,
    graph: Option<&EntityRef<GraphRecord>>,
) -> Result<NodeGraphFilter, CatalogError> {
    Ok(NodeGraphFilter {
        node: node.map(|n| resolve_id(store, n)).transpose()?,
        graph: graph.map(|g| resolve_id(store, g)).transpose()?,
        ..Default::default()
    })
}

// ---------------------------------------------------------------------------
// Program-graph links
// ---------------------------------------------------------------------------

fn find_program_graph<S: CatalogStore>(
    store: &S,
    program: &EntityRef<ProgramRecord>,
    graph: &EntityRef<GraphRecord>,
) -> Result<ProgramGraphRecord, CatalogError> {
    let program = resolve(store, program)?;
    let graph = resolve(store, graph)?;
    store
        .list_program_graphs(&ProgramGraphFilter::pair(program.id, graph.id))?
        .into_iter()
        .next()
        .ok_or_else(|| {
            CatalogError::not_found(
                EntityKind::ProgramGraph,
                format!("{}/{}", program.name, graph.name),
            )
        })
}

fn program_graph_filter<S: CatalogStore>(
    store: &S,
    program: Option<&EntityRef<ProgramRecord>>,
    graph: Option<&EntityRef<GraphRecord>>,
) -> Result<ProgramGraphFilter, CatalogError> {
    Ok(ProgramGraphFilter {
        program: program.map(|p| resolve_id(store, p)).transpose()?,
        graph: graph.map(|g| resolve_id(store, g)).transpose()?,
    })
}

// ---------------------------------------------------------------------------
// Service operations
// ---------------------------------------------------------------------------

impl<S: CatalogStore> CatalogService<S> {
    // -- function-node -----------------------------------------------------

    /// Attaches a function to a node. The link starts without arguments.
    pub fn attach_function(
        &mut self,
        function: &EntityRef<FunctionRecord>,
        node: &EntityRef<NodeRecord>,
    ) -> Result<FunctionNodeId, CatalogError> {
        let link = self.unit(|s| attach_function(s, function, node))?;
        tracing::info!(
            "attached function {} to node {} as function_node {}",
            link.function_id,
            link.node_id,
            link.id
        );
        Ok(link.id)
    }

    /// Binds positional arguments to a link, one per function parameter.
    pub fn attach_args(
        &mut self,
        link: FunctionNodeId,
        args: &[String],
    ) -> Result<Vec<FunctionNodeArgId>, CatalogError> {
        let ids = self.unit(|s| attach_args(s, link, args))?;
        tracing::info!("bound {} arg(s) to function_node {}", ids.len(), link);
        Ok(ids)
    }

    /// Clears the arguments bound to a link so it can be bound again.
    /// Returns the number of arguments removed.
    pub fn detach_args(&mut self, link: FunctionNodeId) -> Result<usize, CatalogError> {
        let removed = self.unit(|s| {
            s.get_function_node(link)?;
            Ok(s.delete_function_node_args(link)?)
        })?;
        tracing::info!("cleared {} arg(s) of function_node {}", removed, link);
        Ok(removed)
    }

    /// Attaches and binds arguments as one unit.
    pub fn attach_function_node(
        &mut self,
        function: &EntityRef<FunctionRecord>,
        node: &EntityRef<NodeRecord>,
        args: &[String],
    ) -> Result<FunctionNodeId, CatalogError> {
        let link = self.unit(|s| {
            let link = attach_function(s, function, node)?;
            attach_args(s, link.id, args)?;
            Ok(link)
        })?;
        tracing::info!(
            "attached function {} to node {} with {} arg(s)",
            link.function_id,
            link.node_id,
            args.len()
        );
        Ok(link.id)
    }

    pub fn detach_function_node(
        &mut self,
        function: &EntityRef<FunctionRecord>,
        node: &EntityRef<NodeRecord>,
    ) -> Result<(), CatalogError> {
        let link = self.unit(|s| {
            let link = find_function_node(s, function, node)?;
            cascade::remove_function_node(s, link.id)?;
            Ok(link)
        })?;
        tracing::info!("detached function_node {}", link.id);
        Ok(())
    }

    /// Removes every link matching the filters. At least one is required.
    pub fn detach_function_nodes(
        &mut self,
        function: Option<&EntityRef<FunctionRecord>>,
        node: Option<&EntityRef<NodeRecord>>,
    ) -> Result<usize, CatalogError> {
        let removed = self.unit(|s| {
            check_has_filter(EntityKind::FunctionNode, &[function.is_some(), node.is_some()])?;
            let filter = function_node_filter(s, function, node)?;
            let links = s.list_function_nodes(&filter)?;
            for link in &links {
                cascade::remove_function_node(s, link.id)?;
            }
            Ok(links.len())
        })?;
        tracing::info!("detached {} function_node link(s)", removed);
        Ok(removed)
    }

    pub fn get_function_node(
        &mut self,
        function: &EntityRef<FunctionRecord>,
        node: &EntityRef<NodeRecord>,
    ) -> Result<FunctionNodeRecord, CatalogError> {
        self.unit(|s| find_function_node(s, function, node))
    }

    pub fn list_function_nodes(
        &mut self,
        function: Option<&EntityRef<FunctionRecord>>,
        node: Option<&EntityRef<NodeRecord>>,
    ) -> Result<Vec<FunctionNodeRecord>, CatalogError> {
        self.unit(|s| {
            let filter = function_node_filter(s, function, node)?;
            Ok(s.list_function_nodes(&filter)?)
        })
    }

    pub fn get_function_node_args(
        &mut self,
        link: FunctionNodeId,
    ) -> Result<Vec<FunctionNodeArgRecord>, CatalogError> {
        self.unit(|s| {
            s.get_function_node(link)?;
            Ok(s.list_function_node_args(link)?)
        })
    }

    // -- node-graph --------------------------------------------------------

    /// Places a node in a graph's tree. Without a parent the placement
    /// becomes the graph's root.
    pub fn attach_node_graph(
        &mut self,
        name: &str,
        node: &EntityRef<NodeRecord>,
        graph: &EntityRef<GraphRecord>,
        parent: Option<&RefKey>,
    ) -> Result<NodeGraphId, CatalogError> {
        let id = self.unit(|s| attach_node_graph(s, name, node, graph, parent))?;
        tracing::info!("placed {} in {} as node_graph '{}' ({})", node, graph, name, id);
        Ok(id)
    }

    /// Removes a placement and its whole subtree.
    pub fn detach_node_graph(&mut self, placement: NodeGraphId) -> Result<usize, CatalogError> {
        let removed = self.unit(|s| {
            let root = s.get_node_graph(placement)?;
            cascade::remove_placement_subtree(s, &root)
        })?;
        tracing::info!("detached node_graph {} ({} placement(s))", placement, removed);
        Ok(removed)
    }

    /// Removes every matching placement with its subtree. At least one
    /// filter is required.
    pub fn detach_node_graphs(
        &mut self,
        node: Option<&EntityRef<NodeRecord>>,
        graph: Option<&EntityRef<GraphRecord>>,
    ) -> Result<usize, CatalogError> {
        let removed = self.unit(|s| {
            check_has_filter(EntityKind::NodeGraph, &[node.is_some(), graph.is_some()])?;
            let filter = node_graph_filter(s, node, graph)?;
            let placements = s.list_node_graphs(&filter)?;
            cascade::remove_placements(s, &placements)
        })?;
        tracing::info!("detached {} node_graph placement(s)", removed);
        Ok(removed)
    }

    pub fn get_node_graph(&mut self, placement: NodeGraphId) -> Result<NodeGraphRecord, CatalogError> {
        self.unit(|s| Ok(s.get_node_graph(placement)?))
    }

    pub fn list_node_graphs(
        &mut self,
        node: Option<&EntityRef<NodeRecord>>,
        graph: Option<&EntityRef<GraphRecord>>,
    ) -> Result<Vec<NodeGraphRecord>, CatalogError> {
        self.unit(|s| {
            let filter = node_graph_filter(s, node, graph)?;
            Ok(s.list_node_graphs(&filter)?)
        })
    }

    // -- program-graph -----------------------------------------------------

    pub fn attach_program_graph(
        &mut self,
        program: &EntityRef<ProgramRecord>,
        graph: &EntityRef<GraphRecord>,
    ) -> Result<ProgramGraphId, CatalogError> {
        let id = self.unit(|s| {
            let program = resolve(s, program)?;
            let graph = resolve(s, graph)?;
            let existing = s.list_program_graphs(&ProgramGraphFilter::pair(program.id, graph.id))?;
            check_link_free(
                EntityKind::ProgramGraph,
                format!("{}/{}", program.name, graph.name),
                existing.first(),
            )?;
            Ok(s.insert_program_graph(program.id, graph.id)?)
        })?;
        tracing::info!("linked {} to {} as program_graph {}", program, graph, id);
        Ok(id)
    }

    pub fn detach_program_graph(
        &mut self,
        program: &EntityRef<ProgramRecord>,
        graph: &EntityRef<GraphRecord>,
    ) -> Result<(), CatalogError> {
        let link = self.unit(|s| {
            let link = find_program_graph(s, program, graph)?;
            s.delete_program_graph(link.id)?;
            Ok(link)
        })?;
        tracing::info!("detached program_graph {}", link.id);
        Ok(())
    }

    /// Removes every matching program-graph link. At least one filter is
    /// required.
    pub fn detach_program_graphs(
        &mut self,
        program: Option<&EntityRef<ProgramRecord>>,
        graph: Option<&EntityRef<GraphRecord>>,
    ) -> Result<usize, CatalogError> {
        let removed = self.unit(|s| {
            check_has_filter(EntityKind::ProgramGraph, &[program.is_some(), graph.is_some()])?;
            let filter = program_graph_filter(s, program, graph)?;
            let links = s.list_program_graphs(&filter)?;
            for link in &links {
                s.delete_program_graph(link.id)?;
            }
            Ok(links.len())
        })?;
        tracing::info!("detached {} program_graph link(s)", removed);
        Ok(removed)
    }

    pub fn get_program_graph(
        &mut self,
        program: &EntityRef<ProgramRecord>,
        graph: &EntityRef<GraphRecord>,
    ) -> Result<ProgramGraphRecord, CatalogError> {
        self.unit(|s| find_program_graph(s, program, graph))
    }

    pub fn list_program_graphs(
        &mut self,
        program: Option<&EntityRef<ProgramRecord>>,
        graph: Option<&EntityRef<GraphRecord>>,
    ) -> Result<Vec<ProgramGraphRecord>, CatalogError> {
        self.unit(|s| {
            let filter = program_graph_filter(s, program, graph)?;
            Ok(s.list_program_graphs(&filter)?)
        })
    }
}
