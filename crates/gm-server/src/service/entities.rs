//! Create, read, list and delete for programs, graphs, nodes and functions,
//! plus the rows programs and functions own (libraries, global variables,
//! parameters).
//!
//! Reads return detail views carrying the ids of related rows. Bulk posts
//! check the whole batch before inserting anything.

use std::collections::BTreeSet;

use gm_check::{check_batch_names, check_name_free, check_params_unbound};
use gm_core::*;
use gm_storage::{
    resolve, resolve_id, CatalogStore, FunctionFilter, FunctionNodeFilter, NodeFilter,
    NodeGraphFilter, ProgramGraphFilter,
};

use super::{cascade, dangling, CatalogError, CatalogService};
use crate::schema::functions::{CreateFunctionRequest, CreateFunctionResponse, FunctionDetail};
use crate::schema::graphs::GraphDetail;
use crate::schema::nodes::NodeDetail;
use crate::schema::programs::{
    CreateProgramRequest, CreateProgramResponse, GlobalVarDetail, GlobalVarPayload, ProgramDetail,
};

// ---------------------------------------------------------------------------
// List queries
// ---------------------------------------------------------------------------

/// Conjunctive filters for listing functions.
#[derive(Debug, Clone, Default)]
pub struct FunctionQuery {
    pub function_type: Option<FunctionType>,
    pub gene_type: Option<String>,
    /// Only functions attached to this node.
    pub node: Option<EntityRef<NodeRecord>>,
}

/// Conjunctive filters for listing nodes.
#[derive(Debug, Clone, Default)]
pub struct NodeQuery {
    pub node_type: Option<NodeType>,
    pub gene_type: Option<String>,
    /// Only nodes hosting this function.
    pub function: Option<EntityRef<FunctionRecord>>,
    /// Only nodes placed in this graph.
    pub graph: Option<EntityRef<GraphRecord>>,
}

/// Conjunctive filters for listing graphs.
#[derive(Debug, Clone, Default)]
pub struct GraphQuery {
    pub program: Option<EntityRef<ProgramRecord>>,
    pub node: Option<EntityRef<NodeRecord>>,
    pub node_graph: Option<NodeGraphId>,
}

#[derive(Debug, Clone, Default)]
pub struct ProgramQuery {
    pub graph: Option<EntityRef<GraphRecord>>,
}

// ---------------------------------------------------------------------------
// Functions and parameters
// ---------------------------------------------------------------------------

/// Links of the function that already carry arguments.
fn links_with_args<S: CatalogStore>(
    store: &S,
    function: FunctionId,
) -> Result<Vec<FunctionNodeRecord>, CatalogError> {
    let mut bound = Vec::new();
    for link in store.list_function_nodes(&FunctionNodeFilter {
        function: Some(function),
        node: None,
    })? {
        if !store.list_function_node_args(link.id)?.is_empty() {
            bound.push(link);
        }
    }
    Ok(bound)
}

fn insert_params<S: CatalogStore>(
    store: &mut S,
    function: &FunctionRecord,
    params: &[NewFunctionParam],
) -> Result<Vec<FunctionParamId>, CatalogError> {
    check_params_unbound(function, &links_with_args(store, function.id)?)?;
    let existing = store.list_function_params(function.id)?;
    check_batch_names(
        EntityKind::FunctionParam,
        &function.name,
        params.iter().map(|p| p.name.as_str()),
        existing.iter().map(|p| p.name.as_str()),
    )?;
    let mut ids = Vec::with_capacity(params.len());
    for param in params {
        ids.push(store.insert_function_param(function.id, param)?);
    }
    Ok(ids)
}

pub(crate) fn create_function<S: CatalogStore>(
    store: &mut S,
    req: &CreateFunctionRequest,
) -> Result<CreateFunctionResponse, CatalogError> {
    let name = &req.function.name;
    check_name_free(EntityKind::Function, name, store.find_function(name)?.as_ref())?;
    let id = store.insert_function(&req.function)?;
    let function = store.get_function(id)?;
    let param_ids = insert_params(store, &function, &req.params)?;
    Ok(CreateFunctionResponse { id, param_ids })
}

fn function_detail<S: CatalogStore>(
    store: &S,
    function: FunctionRecord,
) -> Result<FunctionDetail, CatalogError> {
    let params = store.list_function_params(function.id)?;
    let node_ids = store
        .list_function_nodes(&FunctionNodeFilter {
            function: Some(function.id),
            node: None,
        })?
        .into_iter()
        .map(|link| link.node_id)
        .collect();
    Ok(FunctionDetail {
        id: function.id,
        name: function.name,
        function_type: function.function_type,
        gene_type: function.gene_type,
        code: function.code,
        params,
        node_ids,
    })
}

fn list_functions<S: CatalogStore>(
    store: &S,
    query: &FunctionQuery,
) -> Result<Vec<FunctionRecord>, CatalogError> {
    let mut rows = store.list_functions(&FunctionFilter {
        function_type: query.function_type,
        gene_type: query.gene_type.clone(),
    })?;
    if let Some(node) = &query.node {
        let node = resolve_id(store, node)?;
        let hosted: BTreeSet<FunctionId> = store
            .list_function_nodes(&FunctionNodeFilter {
                function: None,
                node: Some(node),
            })?
            .into_iter()
            .map(|link| link.function_id)
            .collect();
        rows.retain(|f| hosted.contains(&f.id));
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

fn node_detail<S: CatalogStore>(store: &S, node: NodeRecord) -> Result<NodeDetail, CatalogError> {
    let function_ids = store
        .list_function_nodes(&FunctionNodeFilter {
            function: None,
            node: Some(node.id),
        })?
        .into_iter()
        .map(|link| link.function_id)
        .collect();
    let placements = store.list_node_graphs(&NodeGraphFilter {
        node: Some(node.id),
        ..Default::default()
    })?;
    let mut graph_ids: Vec<GraphId> = Vec::new();
    for placement in placements {
        if !graph_ids.contains(&placement.graph_id) {
            graph_ids.push(placement.graph_id);
        }
    }
    Ok(NodeDetail {
        id: node.id,
        name: node.name,
        node_type: node.node_type,
        gene_type: node.gene_type,
        function_ids,
        graph_ids,
    })
}

fn list_nodes<S: CatalogStore>(store: &S, query: &NodeQuery) -> Result<Vec<NodeRecord>, CatalogError> {
    let mut rows = store.list_nodes(&NodeFilter {
        node_type: query.node_type,
        gene_type: query.gene_type.clone(),
    })?;
    if let Some(function) = &query.function {
        let function = resolve_id(store, function)?;
        let hosts: BTreeSet<NodeId> = store
            .list_function_nodes(&FunctionNodeFilter {
                function: Some(function),
                node: None,
            })?
            .into_iter()
            .map(|link| link.node_id)
            .collect();
        rows.retain(|n| hosts.contains(&n.id));
    }
    if let Some(graph) = &query.graph {
        let graph = resolve_id(store, graph)?;
        let placed: BTreeSet<NodeId> = store
            .list_node_graphs(&NodeGraphFilter::in_graph(graph))?
            .into_iter()
            .map(|p| p.node_id)
            .collect();
        rows.retain(|n| placed.contains(&n.id));
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Graphs
// ---------------------------------------------------------------------------

fn graph_detail<S: CatalogStore>(store: &S, graph: GraphRecord) -> Result<GraphDetail, CatalogError> {
    let program_ids = store
        .list_program_graphs(&ProgramGraphFilter {
            program: None,
            graph: Some(graph.id),
        })?
        .into_iter()
        .map(|link| link.program_id)
        .collect();
    let placements = store.list_node_graphs(&NodeGraphFilter::in_graph(graph.id))?;
    let mut node_ids: Vec<NodeId> = Vec::new();
    for placement in &placements {
        if !node_ids.contains(&placement.node_id) {
            node_ids.push(placement.node_id);
        }
    }
    Ok(GraphDetail {
        id: graph.id,
        name: graph.name,
        program_ids,
        node_ids,
        node_graph_ids: placements.into_iter().map(|p| p.id).collect(),
    })
}

fn list_graphs<S: CatalogStore>(store: &S, query: &GraphQuery) -> Result<Vec<GraphRecord>, CatalogError> {
    let mut rows = store.list_graphs()?;
    if let Some(program) = &query.program {
        let program = resolve_id(store, program)?;
        let linked: BTreeSet<GraphId> = store
            .list_program_graphs(&ProgramGraphFilter {
                program: Some(program),
                graph: None,
            })?
            .into_iter()
            .map(|link| link.graph_id)
            .collect();
        rows.retain(|g| linked.contains(&g.id));
    }
    if let Some(node) = &query.node {
        let node = resolve_id(store, node)?;
        let placing: BTreeSet<GraphId> = store
            .list_node_graphs(&NodeGraphFilter {
                node: Some(node),
                ..Default::default()
            })?
            .into_iter()
            .map(|p| p.graph_id)
            .collect();
        rows.retain(|g| placing.contains(&g.id));
    }
    if let Some(placement) = query.node_graph {
        let graph = store.get_node_graph(placement)?.graph_id;
        rows.retain(|g| g.id == graph);
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Programs, libraries, global variables
// ---------------------------------------------------------------------------

fn insert_libraries<S: CatalogStore>(
    store: &mut S,
    program: &ProgramRecord,
    libraries: &[NewLibrary],
) -> Result<Vec<LibraryId>, CatalogError> {
    let existing = store.list_libraries(program.id)?;
    check_batch_names(
        EntityKind::Library,
        &program.name,
        libraries.iter().map(|l| l.name.as_str()),
        existing.iter().map(|l| l.name.as_str()),
    )?;
    let mut ids = Vec::with_capacity(libraries.len());
    for library in libraries {
        ids.push(store.insert_library(program.id, library)?);
    }
    Ok(ids)
}

fn insert_global_vars<S: CatalogStore>(
    store: &mut S,
    program: &ProgramRecord,
    vars: &[GlobalVarPayload],
) -> Result<Vec<GlobalVarId>, CatalogError> {
    let existing = store.list_global_vars(program.id)?;
    check_batch_names(
        EntityKind::GlobalVar,
        &program.name,
        vars.iter().map(|v| v.var.name.as_str()),
        existing.iter().map(|v| v.name.as_str()),
    )?;
    let mut ids = Vec::with_capacity(vars.len());
    for payload in vars {
        let id = store.insert_global_var(program.id, &payload.var)?;
        for arg in &payload.args {
            store.insert_global_var_arg(id, arg)?;
        }
        ids.push(id);
    }
    Ok(ids)
}

pub(crate) fn create_program<S: CatalogStore>(
    store: &mut S,
    req: &CreateProgramRequest,
) -> Result<CreateProgramResponse, CatalogError> {
    check_name_free(EntityKind::Program, &req.name, store.find_program(&req.name)?.as_ref())?;
    let id = store.insert_program(&NewProgram {
        name: req.name.clone(),
    })?;
    let program = store.get_program(id)?;
    let library_ids = insert_libraries(store, &program, &req.libraries)?;
    let global_var_ids = insert_global_vars(store, &program, &req.global_vars)?;
    Ok(CreateProgramResponse {
        id,
        library_ids,
        global_var_ids,
    })
}

fn program_detail<S: CatalogStore>(
    store: &S,
    program: ProgramRecord,
) -> Result<ProgramDetail, CatalogError> {
    let library_ids = store
        .list_libraries(program.id)?
        .into_iter()
        .map(|l| l.id)
        .collect();
    let global_var_ids = store
        .list_global_vars(program.id)?
        .into_iter()
        .map(|v| v.id)
        .collect();
    let graph_ids = store
        .list_program_graphs(&ProgramGraphFilter {
            program: Some(program.id),
            graph: None,
        })?
        .into_iter()
        .map(|link| link.graph_id)
        .collect();
    Ok(ProgramDetail {
        id: program.id,
        name: program.name,
        library_ids,
        global_var_ids,
        graph_ids,
    })
}

fn list_programs<S: CatalogStore>(
    store: &S,
    query: &ProgramQuery,
) -> Result<Vec<ProgramRecord>, CatalogError> {
    let mut rows = store.list_programs()?;
    if let Some(graph) = &query.graph {
        let graph = resolve_id(store, graph)?;
        let linked: BTreeSet<ProgramId> = store
            .list_program_graphs(&ProgramGraphFilter {
                program: None,
                graph: Some(graph),
            })?
            .into_iter()
            .map(|link| link.program_id)
            .collect();
        rows.retain(|p| linked.contains(&p.id));
    }
    Ok(rows)
}

pub(crate) fn global_var_detail<S: CatalogStore>(
    store: &S,
    var: GlobalVarRecord,
) -> Result<GlobalVarDetail, CatalogError> {
    let args = store
        .list_global_var_args(var.id)?
        .into_iter()
        .map(|a| a.arg)
        .collect();
    Ok(GlobalVarDetail {
        id: var.id,
        program_id: var.program_id,
        name: var.name,
        var_type: var.var_type,
        is_const: var.is_const,
        args,
    })
}

// ---------------------------------------------------------------------------
// Service operations
// ---------------------------------------------------------------------------

impl<S: CatalogStore> CatalogService<S> {
    // -- functions ---------------------------------------------------------

    /// Creates a function and, in the same unit, its parameters.
    pub fn create_function(
        &mut self,
        req: &CreateFunctionRequest,
    ) -> Result<CreateFunctionResponse, CatalogError> {
        let created = self.unit(|s| create_function(s, req))?;
        tracing::info!(
            "created function '{}' ({}) with {} param(s)",
            req.function.name,
            created.id,
            created.param_ids.len()
        );
        Ok(created)
    }

    pub fn get_function(
        &mut self,
        function: &EntityRef<FunctionRecord>,
    ) -> Result<FunctionDetail, CatalogError> {
        self.unit(|s| {
            let function = resolve(s, function)?;
            function_detail(s, function)
        })
    }

    pub fn list_functions(
        &mut self,
        query: &FunctionQuery,
    ) -> Result<Vec<FunctionRecord>, CatalogError> {
        self.unit(|s| list_functions(s, query))
    }

    /// Deletes a function with its links, link arguments and parameters.
    pub fn delete_function(
        &mut self,
        function: &EntityRef<FunctionRecord>,
    ) -> Result<(), CatalogError> {
        let removed = self.unit(|s| {
            let function = resolve(s, function)?;
            cascade::delete_function(s, function.id)?;
            Ok(function)
        })?;
        tracing::info!("deleted function '{}' ({})", removed.name, removed.id);
        Ok(())
    }

    /// Appends parameters to a function. Rejects the whole batch if any name
    /// is already used by the function or repeated in the batch, and while
    /// any link of the function has arguments bound.
    pub fn post_function_params(
        &mut self,
        function: &EntityRef<FunctionRecord>,
        params: &[NewFunctionParam],
    ) -> Result<Vec<FunctionParamId>, CatalogError> {
        self.unit(|s| {
            let function = resolve(s, function)?;
            insert_params(s, &function, params)
        })
    }

    /// Removes every parameter of a function. Rejected while any link of
    /// the function has arguments bound.
    pub fn delete_function_params(
        &mut self,
        function: &EntityRef<FunctionRecord>,
    ) -> Result<usize, CatalogError> {
        let (id, removed) = self.unit(|s| {
            let function = resolve(s, function)?;
            check_params_unbound(&function, &links_with_args(s, function.id)?)?;
            Ok((function.id, s.delete_function_params(function.id)?))
        })?;
        tracing::info!("removed {} param(s) of function {}", removed, id);
        Ok(removed)
    }

    pub fn list_function_params(
        &mut self,
        function: &EntityRef<FunctionRecord>,
    ) -> Result<Vec<FunctionParamRecord>, CatalogError> {
        self.unit(|s| {
            let function = resolve(s, function)?;
            Ok(s.list_function_params(function.id)?)
        })
    }

    // -- nodes -------------------------------------------------------------

    pub fn create_node(&mut self, node: &NewNode) -> Result<NodeId, CatalogError> {
        let id = self.unit(|s| {
            check_name_free(EntityKind::Node, &node.name, s.find_node(&node.name)?.as_ref())?;
            Ok(s.insert_node(node)?)
        })?;
        tracing::info!("created {} '{}' ({})", node.node_type, node.name, id);
        Ok(id)
    }

    pub fn get_node(&mut self, node: &EntityRef<NodeRecord>) -> Result<NodeDetail, CatalogError> {
        self.unit(|s| {
            let node = resolve(s, node)?;
            node_detail(s, node)
        })
    }

    pub fn list_nodes(&mut self, query: &NodeQuery) -> Result<Vec<NodeRecord>, CatalogError> {
        self.unit(|s| list_nodes(s, query))
    }

    /// Deletes a node with its function links and every placement of it
    /// (including the subtrees below those placements).
    pub fn delete_node(&mut self, node: &EntityRef<NodeRecord>) -> Result<(), CatalogError> {
        let removed = self.unit(|s| {
            let node = resolve(s, node)?;
            cascade::delete_node(s, node.id)?;
            Ok(node)
        })?;
        tracing::info!("deleted node '{}' ({})", removed.name, removed.id);
        Ok(())
    }

    // -- graphs ------------------------------------------------------------

    pub fn create_graph(&mut self, graph: &NewGraph) -> Result<GraphId, CatalogError> {
        let id = self.unit(|s| {
            check_name_free(EntityKind::Graph, &graph.name, s.find_graph(&graph.name)?.as_ref())?;
            Ok(s.insert_graph(graph)?)
        })?;
        tracing::info!("created graph '{}' ({})", graph.name, id);
        Ok(id)
    }

    pub fn get_graph(&mut self, graph: &EntityRef<GraphRecord>) -> Result<GraphDetail, CatalogError> {
        self.unit(|s| {
            let graph = resolve(s, graph)?;
            graph_detail(s, graph)
        })
    }

    pub fn list_graphs(&mut self, query: &GraphQuery) -> Result<Vec<GraphRecord>, CatalogError> {
        self.unit(|s| list_graphs(s, query))
    }

    /// Deletes a graph with its whole placement tree and its program links.
    pub fn delete_graph(&mut self, graph: &EntityRef<GraphRecord>) -> Result<(), CatalogError> {
        let removed = self.unit(|s| {
            let graph = resolve(s, graph)?;
            cascade::delete_graph(s, graph.id)?;
            Ok(graph)
        })?;
        tracing::info!("deleted graph '{}' ({})", removed.name, removed.id);
        Ok(())
    }

    // -- programs ----------------------------------------------------------

    /// Creates a program with its libraries and global variables.
    pub fn create_program(
        &mut self,
        req: &CreateProgramRequest,
    ) -> Result<CreateProgramResponse, CatalogError> {
        let created = self.unit(|s| create_program(s, req))?;
        tracing::info!("created program '{}' ({})", req.name, created.id);
        Ok(created)
    }

    pub fn get_program(
        &mut self,
        program: &EntityRef<ProgramRecord>,
    ) -> Result<ProgramDetail, CatalogError> {
        self.unit(|s| {
            let program = resolve(s, program)?;
            program_detail(s, program)
        })
    }

    pub fn list_programs(&mut self, query: &ProgramQuery) -> Result<Vec<ProgramRecord>, CatalogError> {
        self.unit(|s| list_programs(s, query))
    }

    /// Deletes a program with its graph links, libraries and global variables.
    /// Linked graphs themselves are kept.
    pub fn delete_program(&mut self, program: &EntityRef<ProgramRecord>) -> Result<(), CatalogError> {
        let removed = self.unit(|s| {
            let program = resolve(s, program)?;
            cascade::delete_program(s, program.id)?;
            Ok(program)
        })?;
        tracing::info!("deleted program '{}' ({})", removed.name, removed.id);
        Ok(())
    }

    pub fn post_libraries(
        &mut self,
        program: &EntityRef<ProgramRecord>,
        libraries: &[NewLibrary],
    ) -> Result<Vec<LibraryId>, CatalogError> {
        self.unit(|s| {
            let program = resolve(s, program)?;
            insert_libraries(s, &program, libraries)
        })
    }

    pub fn list_libraries(
        &mut self,
        program: &EntityRef<ProgramRecord>,
    ) -> Result<Vec<LibraryRecord>, CatalogError> {
        self.unit(|s| {
            let program = resolve(s, program)?;
            Ok(s.list_libraries(program.id)?)
        })
    }

    pub fn delete_library(&mut self, library: LibraryId) -> Result<(), CatalogError> {
        self.unit(|s| Ok(s.delete_library(library)?))?;
        tracing::info!("deleted library {}", library);
        Ok(())
    }

    pub fn post_global_vars(
        &mut self,
        program: &EntityRef<ProgramRecord>,
        vars: &[GlobalVarPayload],
    ) -> Result<Vec<GlobalVarId>, CatalogError> {
        self.unit(|s| {
            let program = resolve(s, program)?;
            insert_global_vars(s, &program, vars)
        })
    }

    pub fn list_global_vars(
        &mut self,
        program: &EntityRef<ProgramRecord>,
    ) -> Result<Vec<GlobalVarDetail>, CatalogError> {
        self.unit(|s| {
            let program = resolve(s, program)?;
            s.list_global_vars(program.id)?
                .into_iter()
                .map(|var| global_var_detail(s, var))
                .collect()
        })
    }

    pub fn get_global_var(&mut self, var: GlobalVarId) -> Result<GlobalVarDetail, CatalogError> {
        self.unit(|s| {
            let var = s.get_global_var(var)?;
            s.get_program(var.program_id)
                .map_err(dangling(format!("global_var {}", var.id)))?;
            global_var_detail(s, var)
        })
    }

    /// Deletes a global variable and its arguments.
    pub fn delete_global_var(&mut self, var: GlobalVarId) -> Result<(), CatalogError> {
        self.unit(|s| {
            s.get_global_var(var)?;
            cascade::delete_global_var(s, var)
        })?;
        tracing::info!("deleted global_var {}", var);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::programs::CreateProgramRequest;
    use gm_storage::InMemoryStore;

    fn service() -> CatalogService<InMemoryStore> {
        CatalogService::in_memory()
    }

    fn function_req(name: &str, params: &[&str]) -> CreateFunctionRequest {
        CreateFunctionRequest {
            function: NewFunction {
                name: name.into(),
                function_type: FunctionType::Mutation,
                gene_type: "int".into(),
                code: String::new(),
            },
            params: params
                .iter()
                .map(|p| NewFunctionParam {
                    name: p.to_string(),
                    param_type: "int".into(),
                    is_const: false,
                    is_ref: false,
                })
                .collect(),
        }
    }

    #[test]
    fn new_program_has_no_related_rows() {
        let mut svc = service();
        svc.create_program(&CreateProgramRequest {
            name: "P".into(),
            libraries: vec![],
            global_vars: vec![],
        })
        .unwrap();

        let detail = svc.get_program(&EntityRef::name("P")).unwrap();
        assert!(detail.library_ids.is_empty());
        assert!(detail.global_var_ids.is_empty());
        assert!(detail.graph_ids.is_empty());
    }

    #[test]
    fn duplicate_names_are_already_exists() {
        let mut svc = service();
        svc.create_graph(&NewGraph { name: "g".into() }).unwrap();
        let err = svc.create_graph(&NewGraph { name: "g".into() }).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::AlreadyExists { kind: EntityKind::Graph, ref key, .. } if key == "g"
        ));
    }

    #[test]
    fn function_params_keep_creation_order() {
        let mut svc = service();
        let created = svc.create_function(&function_req("mut", &["b", "a", "c"])).unwrap();
        assert_eq!(created.param_ids.len(), 3);
        let names: Vec<String> = svc
            .get_function(&EntityRef::id(created.id))
            .unwrap()
            .params
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn colliding_batch_inserts_nothing() {
        let mut svc = service();
        svc.create_function(&function_req("f", &["x"])).unwrap();

        let batch = vec![
            NewFunctionParam {
                name: "y".into(),
                param_type: "int".into(),
                is_const: false,
                is_ref: false,
            },
            NewFunctionParam {
                name: "x".into(),
                param_type: "int".into(),
                is_const: false,
                is_ref: false,
            },
        ];
        let err = svc
            .post_function_params(&EntityRef::name("f"), &batch)
            .unwrap_err();
        assert!(matches!(err, CatalogError::AlreadyExists { .. }));
        assert_eq!(
            svc.list_function_params(&EntityRef::name("f")).unwrap().len(),
            1
        );
    }

    #[test]
    fn failed_create_leaves_no_partial_rows() {
        let mut svc = service();
        let err = svc
            .create_function(&function_req("f", &["x", "x"]))
            .unwrap_err();
        assert!(matches!(err, CatalogError::AlreadyExists { .. }));
        assert!(svc.list_functions(&FunctionQuery::default()).unwrap().is_empty());
    }

    #[test]
    fn program_owns_libraries_and_globals() {
        let mut svc = service();
        let req: CreateProgramRequest = serde_json::from_value(serde_json::json!({
            "name": "ga",
            "libraries": [{"name": "vector", "is_stl": true}],
            "global_vars": [{"name": "rng", "type": "std::mt19937", "args": ["42"]}]
        }))
        .unwrap();
        let created = svc.create_program(&req).unwrap();

        let vars = svc.list_global_vars(&EntityRef::id(created.id)).unwrap();
        assert_eq!(vars[0].args, vec!["42"]);

        svc.delete_program(&EntityRef::name("ga")).unwrap();
        assert!(matches!(
            svc.get_global_var(created.global_var_ids[0]),
            Err(CatalogError::NotFound { kind: EntityKind::GlobalVar, .. })
        ));
        assert!(svc.store().list_libraries(created.id).unwrap().is_empty());
    }

    #[test]
    fn unknown_reference_is_not_found() {
        let mut svc = service();
        let err = svc.get_node(&EntityRef::name("ghost")).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::NotFound { kind: EntityKind::Node, ref key } if key == "ghost"
        ));
    }

    #[test]
    fn node_list_filters_by_type_and_gene_type() {
        let mut svc = service();
        for (name, node_type, gene) in [
            ("a", NodeType::KNode, "int"),
            ("b", NodeType::KNode, "float"),
            ("c", NodeType::UnaryNode, "int"),
        ] {
            svc.create_node(&NewNode {
                name: name.into(),
                node_type,
                gene_type: gene.into(),
            })
            .unwrap();
        }
        let rows = svc
            .list_nodes(&NodeQuery {
                node_type: Some(NodeType::KNode),
                gene_type: Some("int".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "a");
    }
}
