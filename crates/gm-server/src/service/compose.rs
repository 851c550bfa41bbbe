//! Nested read views of nodes, graphs and programs.
//!
//! Views are assembled from the relational rows inside one atomic unit, so
//! they see a consistent snapshot. The entity being composed is looked up
//! normally (a missing one is NotFound); any row it references that turns out
//! to be missing is an integrity fault.

use std::collections::HashMap;

use gm_core::*;
use gm_storage::{
    resolve, CatalogStore, FunctionNodeFilter, NodeGraphFilter, ProgramGraphFilter, StorageError,
};

use super::{dangling, CatalogError, CatalogService};
use crate::schema::compose::{
    BoundParamView, GlobalVarView, GraphView, HostedFunctionView, NodeView, ProgramView,
    TreeEdgeView,
};

fn hosted_function<S: CatalogStore>(
    store: &S,
    link: &FunctionNodeRecord,
) -> Result<HostedFunctionView, CatalogError> {
    let function = store
        .get_function(link.function_id)
        .map_err(dangling(format!("function_node {}", link.id)))?;
    let params = store.list_function_params(function.id)?;
    let mut args = store.list_function_node_args(link.id)?.into_iter();

    // Arguments line up with parameters by position; an unbound link has none.
    let params = params
        .into_iter()
        .map(|param| BoundParamView {
            name: param.name,
            param_type: param.param_type,
            is_const: param.is_const,
            is_ref: param.is_ref,
            arg: args.next().map(|a| a.arg),
        })
        .collect();

    Ok(HostedFunctionView {
        link_id: link.id,
        function_id: function.id,
        name: function.name,
        function_type: function.function_type,
        gene_type: function.gene_type,
        code: function.code,
        params,
    })
}

fn node_view<S: CatalogStore>(store: &S, node: NodeRecord) -> Result<NodeView, CatalogError> {
    let links = store.list_function_nodes(&FunctionNodeFilter {
        function: None,
        node: Some(node.id),
    })?;
    let functions = links
        .iter()
        .map(|link| hosted_function(store, link))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(NodeView {
        id: node.id,
        name: node.name,
        node_type: node.node_type,
        gene_type: node.gene_type,
        functions,
    })
}

fn graph_view<S: CatalogStore>(store: &S, graph: GraphRecord) -> Result<GraphView, CatalogError> {
    let placements = store.list_node_graphs(&NodeGraphFilter::in_graph(graph.id))?;
    let names: HashMap<NodeGraphId, &str> =
        placements.iter().map(|p| (p.id, p.name.as_str())).collect();

    let mut edges = Vec::with_capacity(placements.len());
    let mut nodes: Vec<NodeView> = Vec::new();
    let mut node_names: HashMap<NodeId, String> = HashMap::new();

    for placement in &placements {
        let context = format!("node_graph {}", placement.id);
        let parent = match placement.parent_id {
            Some(parent) => match names.get(&parent) {
                Some(name) => Some(name.to_string()),
                None => {
                    let missing = StorageError::not_found(EntityKind::NodeGraph, parent);
                    return Err(dangling(context)(missing));
                }
            },
            None => None,
        };

        let node_name = match node_names.get(&placement.node_id) {
            Some(name) => name.clone(),
            None => {
                let node = store
                    .get_node(placement.node_id)
                    .map_err(dangling(&context))?;
                let name = node.name.clone();
                node_names.insert(node.id, name.clone());
                nodes.push(node_view(store, node)?);
                name
            }
        };

        edges.push(TreeEdgeView {
            id: placement.id,
            name: placement.name.clone(),
            parent,
            node: node_name,
        });
    }

    Ok(GraphView {
        id: graph.id,
        name: graph.name,
        edges,
        nodes,
    })
}

fn program_view<S: CatalogStore>(
    store: &S,
    program: ProgramRecord,
) -> Result<ProgramView, CatalogError> {
    let libraries = store.list_libraries(program.id)?;

    let mut global_vars = Vec::new();
    for var in store.list_global_vars(program.id)? {
        let args = store
            .list_global_var_args(var.id)?
            .into_iter()
            .map(|a| a.arg)
            .collect();
        global_vars.push(GlobalVarView {
            id: var.id,
            name: var.name,
            var_type: var.var_type,
            is_const: var.is_const,
            args,
        });
    }

    let mut graphs = Vec::new();
    for link in store.list_program_graphs(&ProgramGraphFilter {
        program: Some(program.id),
        graph: None,
    })? {
        let graph = store
            .get_graph(link.graph_id)
            .map_err(dangling(format!("program_graph {}", link.id)))?;
        graphs.push(graph_view(store, graph)?);
    }

    Ok(ProgramView {
        id: program.id,
        name: program.name,
        libraries,
        global_vars,
        graphs,
    })
}

impl<S: CatalogStore> CatalogService<S> {
    /// A node with every function it hosts, each with its parameters paired
    /// to the link's arguments.
    pub fn compose_node(&mut self, node: &EntityRef<NodeRecord>) -> Result<NodeView, CatalogError> {
        self.unit(|s| {
            let node = resolve(s, node)?;
            node_view(s, node)
        })
    }

    /// A graph's tree as a flat edge list, plus a view of every placed node.
    pub fn compose_graph(&mut self, graph: &EntityRef<GraphRecord>) -> Result<GraphView, CatalogError> {
        self.unit(|s| {
            let graph = resolve(s, graph)?;
            graph_view(s, graph)
        })
    }

    /// A program with its libraries, global variables and composed graphs.
    pub fn compose_program(
        &mut self,
        program: &EntityRef<ProgramRecord>,
    ) -> Result<ProgramView, CatalogError> {
        self.unit(|s| {
            let program = resolve(s, program)?;
            program_view(s, program)
        })
    }
}
