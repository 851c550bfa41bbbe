//! In-memory implementation of [`CatalogStore`].
//!
//! [`InMemoryStore`] is a first-class backend for tests and throwaway
//! sessions. It keeps one ordered map per table and enforces the same
//! uniqueness and referential rules as the SQLite schema, so the service
//! behaves identically on either backend.

use std::collections::BTreeMap;
use std::fmt;

use gm_core::*;

use crate::error::StorageError;
use crate::traits::CatalogStore;
use crate::types::{
    FunctionFilter, FunctionNodeFilter, NodeFilter, NodeGraphFilter, ProgramGraphFilter,
};

/// Rows of one kind, keyed by id. Ids are never reused.
#[derive(Debug, Clone)]
struct Table<R: Entity> {
    rows: BTreeMap<R::Id, R>,
    last_id: i64,
}

impl<R: Entity> Default for Table<R> {
    fn default() -> Self {
        Table {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<R: Entity> Table<R> {
    fn next_id(&mut self) -> R::Id {
        self.last_id += 1;
        R::Id::from(self.last_id)
    }

    fn insert(&mut self, row: R) {
        self.rows.insert(row.id(), row);
    }

    fn get(&self, id: R::Id) -> Result<R, StorageError> {
        self.rows
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::not_found(R::KIND, id))
    }

    fn contains(&self, id: R::Id) -> bool {
        self.rows.contains_key(&id)
    }

    fn any(&self, pred: impl Fn(&R) -> bool) -> bool {
        self.rows.values().any(pred)
    }

    fn find(&self, pred: impl Fn(&R) -> bool) -> Option<R> {
        self.rows.values().find(|r| pred(*r)).cloned()
    }

    fn select(&self, pred: impl Fn(&R) -> bool) -> Vec<R> {
        self.rows.values().filter(|r| pred(*r)).cloned().collect()
    }

    fn remove(&mut self, id: R::Id) -> Result<R, StorageError> {
        self.rows
            .remove(&id)
            .ok_or_else(|| StorageError::not_found(R::KIND, id))
    }

    fn remove_where(&mut self, pred: impl Fn(&R) -> bool) -> usize {
        let before = self.rows.len();
        self.rows.retain(|_, r| !pred(&*r));
        before - self.rows.len()
    }
}

/// In-memory catalog backend.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    programs: Table<ProgramRecord>,
    graphs: Table<GraphRecord>,
    nodes: Table<NodeRecord>,
    functions: Table<FunctionRecord>,
    function_params: Table<FunctionParamRecord>,
    libraries: Table<LibraryRecord>,
    global_vars: Table<GlobalVarRecord>,
    global_var_args: Table<GlobalVarArgRecord>,
    function_nodes: Table<FunctionNodeRecord>,
    function_node_args: Table<FunctionNodeArgRecord>,
    program_graphs: Table<ProgramGraphRecord>,
    node_graphs: Table<NodeGraphRecord>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Fails unless the owning row exists.
fn require<R: Entity>(table: &Table<R>, id: R::Id) -> Result<(), StorageError> {
    if table.contains(id) {
        Ok(())
    } else {
        Err(StorageError::integrity(format!(
            "referenced {} {} does not exist",
            R::KIND,
            id
        )))
    }
}

/// Fails when `referenced` is true.
fn restrict(
    kind: EntityKind,
    id: impl fmt::Display,
    dependent: EntityKind,
    referenced: bool,
) -> Result<(), StorageError> {
    if referenced {
        Err(StorageError::integrity(format!(
            "{} {} is still referenced by {} rows",
            kind, id, dependent
        )))
    } else {
        Ok(())
    }
}

fn matches_opt<T: PartialEq>(want: &Option<T>, actual: &T) -> bool {
    want.as_ref().map_or(true, |w| w == actual)
}

impl CatalogStore for InMemoryStore {
    fn atomically<T, E, F>(&mut self, op: F) -> Result<T, E>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<StorageError> + fmt::Display,
    {
        let snapshot = self.clone();
        match op(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                *self = snapshot;
                Err(err)
            }
        }
    }

    // -------------------------------------------------------------------
    // Programs
    // -------------------------------------------------------------------

    fn insert_program(&mut self, program: &NewProgram) -> Result<ProgramId, StorageError> {
        if self.programs.any(|p| p.name == program.name) {
            return Err(StorageError::duplicate(EntityKind::Program, &program.name));
        }
        let id = self.programs.next_id();
        self.programs.insert(ProgramRecord {
            id,
            name: program.name.clone(),
        });
        Ok(id)
    }

    fn get_program(&self, id: ProgramId) -> Result<ProgramRecord, StorageError> {
        self.programs.get(id)
    }

    fn find_program(&self, name: &str) -> Result<Option<ProgramRecord>, StorageError> {
        Ok(self.programs.find(|p| p.name == name))
    }

    fn list_programs(&self) -> Result<Vec<ProgramRecord>, StorageError> {
        Ok(self.programs.select(|_| true))
    }

    fn delete_program(&mut self, id: ProgramId) -> Result<(), StorageError> {
        self.programs.get(id)?;
        let kind = EntityKind::Program;
        restrict(kind, id, EntityKind::Library, self.libraries.any(|l| l.program_id == id))?;
        restrict(kind, id, EntityKind::GlobalVar, self.global_vars.any(|v| v.program_id == id))?;
        restrict(kind, id, EntityKind::ProgramGraph, self.program_graphs.any(|pg| pg.program_id == id))?;
        self.programs.remove(id)?;
        Ok(())
    }

    // -------------------------------------------------------------------
    // Graphs
    // -------------------------------------------------------------------

    fn insert_graph(&mut self, graph: &NewGraph) -> Result<GraphId, StorageError> {
        if self.graphs.any(|g| g.name == graph.name) {
            return Err(StorageError::duplicate(EntityKind::Graph, &graph.name));
        }
        let id = self.graphs.next_id();
        self.graphs.insert(GraphRecord {
            id,
            name: graph.name.clone(),
        });
        Ok(id)
    }

    fn get_graph(&self, id: GraphId) -> Result<GraphRecord, StorageError> {
        self.graphs.get(id)
    }

    fn find_graph(&self, name: &str) -> Result<Option<GraphRecord>, StorageError> {
        Ok(self.graphs.find(|g| g.name == name))
    }

    fn list_graphs(&self) -> Result<Vec<GraphRecord>, StorageError> {
        Ok(self.graphs.select(|_| true))
    }

    fn delete_graph(&mut self, id: GraphId) -> Result<(), StorageError> {
        self.graphs.get(id)?;
        let kind = EntityKind::Graph;
        restrict(kind, id, EntityKind::ProgramGraph, self.program_graphs.any(|pg| pg.graph_id == id))?;
        restrict(kind, id, EntityKind::NodeGraph, self.node_graphs.any(|ng| ng.graph_id == id))?;
        self.graphs.remove(id)?;
        Ok(())
    }

    // -------------------------------------------------------------------
    // Nodes
    // -------------------------------------------------------------------

    fn insert_node(&mut self, node: &NewNode) -> Result<NodeId, StorageError> {
        if self.nodes.any(|n| n.name == node.name) {
            return Err(StorageError::duplicate(EntityKind::Node, &node.name));
        }
        let id = self.nodes.next_id();
        self.nodes.insert(NodeRecord {
            id,
            name: node.name.clone(),
            node_type: node.node_type,
            gene_type: node.gene_type.clone(),
        });
        Ok(id)
    }

    fn get_node(&self, id: NodeId) -> Result<NodeRecord, StorageError> {
        self.nodes.get(id)
    }

    fn find_node(&self, name: &str) -> Result<Option<NodeRecord>, StorageError> {
        Ok(self.nodes.find(|n| n.name == name))
    }

    fn list_nodes(&self, filter: &NodeFilter) -> Result<Vec<NodeRecord>, StorageError> {
        Ok(self.nodes.select(|n| {
            matches_opt(&filter.node_type, &n.node_type)
                && matches_opt(&filter.gene_type, &n.gene_type)
        }))
    }

    fn delete_node(&mut self, id: NodeId) -> Result<(), StorageError> {
        self.nodes.get(id)?;
        let kind = EntityKind::Node;
        restrict(kind, id, EntityKind::FunctionNode, self.function_nodes.any(|fn_| fn_.node_id == id))?;
        restrict(kind, id, EntityKind::NodeGraph, self.node_graphs.any(|ng| ng.node_id == id))?;
        self.nodes.remove(id)?;
        Ok(())
    }

    // -------------------------------------------------------------------
    // Functions and their parameters
    // -------------------------------------------------------------------

    fn insert_function(&mut self, function: &NewFunction) -> Result<FunctionId, StorageError> {
        if self.functions.any(|f| f.name == function.name) {
            return Err(StorageError::duplicate(EntityKind::Function, &function.name));
        }
        let id = self.functions.next_id();
        self.functions.insert(FunctionRecord {
            id,
            name: function.name.clone(),
            function_type: function.function_type,
            gene_type: function.gene_type.clone(),
            code: function.code.clone(),
        });
        Ok(id)
    }

    fn get_function(&self, id: FunctionId) -> Result<FunctionRecord, StorageError> {
        self.functions.get(id)
    }

    fn find_function(&self, name: &str) -> Result<Option<FunctionRecord>, StorageError> {
        Ok(self.functions.find(|f| f.name == name))
    }

    fn list_functions(&self, filter: &FunctionFilter) -> Result<Vec<FunctionRecord>, StorageError> {
        Ok(self.functions.select(|f| {
            matches_opt(&filter.function_type, &f.function_type)
                && matches_opt(&filter.gene_type, &f.gene_type)
        }))
    }

    fn delete_function(&mut self, id: FunctionId) -> Result<(), StorageError> {
        self.functions.get(id)?;
        let kind = EntityKind::Function;
        restrict(kind, id, EntityKind::FunctionParam, self.function_params.any(|p| p.function_id == id))?;
        restrict(kind, id, EntityKind::FunctionNode, self.function_nodes.any(|fn_| fn_.function_id == id))?;
        self.functions.remove(id)?;
        Ok(())
    }

    fn insert_function_param(
        &mut self,
        function: FunctionId,
        param: &NewFunctionParam,
    ) -> Result<FunctionParamId, StorageError> {
        require(&self.functions, function)?;
        if self
            .function_params
            .any(|p| p.function_id == function && p.name == param.name)
        {
            return Err(StorageError::duplicate(EntityKind::FunctionParam, &param.name));
        }
        let id = self.function_params.next_id();
        self.function_params.insert(FunctionParamRecord {
            id,
            function_id: function,
            name: param.name.clone(),
            param_type: param.param_type.clone(),
            is_const: param.is_const,
            is_ref: param.is_ref,
        });
        Ok(id)
    }

    fn get_function_param(&self, id: FunctionParamId) -> Result<FunctionParamRecord, StorageError> {
        self.function_params.get(id)
    }

    fn list_function_params(
        &self,
        function: FunctionId,
    ) -> Result<Vec<FunctionParamRecord>, StorageError> {
        Ok(self.function_params.select(|p| p.function_id == function))
    }

    fn delete_function_params(&mut self, function: FunctionId) -> Result<usize, StorageError> {
        Ok(self.function_params.remove_where(|p| p.function_id == function))
    }

    // -------------------------------------------------------------------
    // Program-owned rows
    // -------------------------------------------------------------------

    fn insert_library(
        &mut self,
        program: ProgramId,
        library: &NewLibrary,
    ) -> Result<LibraryId, StorageError> {
        require(&self.programs, program)?;
        if self
            .libraries
            .any(|l| l.program_id == program && l.name == library.name)
        {
            return Err(StorageError::duplicate(EntityKind::Library, &library.name));
        }
        let id = self.libraries.next_id();
        self.libraries.insert(LibraryRecord {
            id,
            program_id: program,
            name: library.name.clone(),
            is_stl: library.is_stl,
        });
        Ok(id)
    }

    fn get_library(&self, id: LibraryId) -> Result<LibraryRecord, StorageError> {
        self.libraries.get(id)
    }

    fn list_libraries(&self, program: ProgramId) -> Result<Vec<LibraryRecord>, StorageError> {
        Ok(self.libraries.select(|l| l.program_id == program))
    }

    fn delete_library(&mut self, id: LibraryId) -> Result<(), StorageError> {
        self.libraries.remove(id)?;
        Ok(())
    }

    fn insert_global_var(
        &mut self,
        program: ProgramId,
        var: &NewGlobalVar,
    ) -> Result<GlobalVarId, StorageError> {
        require(&self.programs, program)?;
        if self
            .global_vars
            .any(|v| v.program_id == program && v.name == var.name)
        {
            return Err(StorageError::duplicate(EntityKind::GlobalVar, &var.name));
        }
        let id = self.global_vars.next_id();
        self.global_vars.insert(GlobalVarRecord {
            id,
            program_id: program,
            name: var.name.clone(),
            var_type: var.var_type.clone(),
            is_const: var.is_const,
        });
        Ok(id)
    }

    fn get_global_var(&self, id: GlobalVarId) -> Result<GlobalVarRecord, StorageError> {
        self.global_vars.get(id)
    }

    fn list_global_vars(&self, program: ProgramId) -> Result<Vec<GlobalVarRecord>, StorageError> {
        Ok(self.global_vars.select(|v| v.program_id == program))
    }

    fn delete_global_var(&mut self, id: GlobalVarId) -> Result<(), StorageError> {
        self.global_vars.get(id)?;
        restrict(
            EntityKind::GlobalVar,
            id,
            EntityKind::GlobalVarArg,
            self.global_var_args.any(|a| a.global_var_id == id),
        )?;
        self.global_vars.remove(id)?;
        Ok(())
    }

    fn insert_global_var_arg(
        &mut self,
        var: GlobalVarId,
        arg: &str,
    ) -> Result<GlobalVarArgId, StorageError> {
        require(&self.global_vars, var)?;
        let id = self.global_var_args.next_id();
        self.global_var_args.insert(GlobalVarArgRecord {
            id,
            global_var_id: var,
            arg: arg.to_string(),
        });
        Ok(id)
    }

    fn list_global_var_args(
        &self,
        var: GlobalVarId,
    ) -> Result<Vec<GlobalVarArgRecord>, StorageError> {
        Ok(self.global_var_args.select(|a| a.global_var_id == var))
    }

    fn delete_global_var_args(&mut self, var: GlobalVarId) -> Result<usize, StorageError> {
        Ok(self.global_var_args.remove_where(|a| a.global_var_id == var))
    }

    // -------------------------------------------------------------------
    // Function-node links and their arguments
    // -------------------------------------------------------------------

    fn insert_function_node(
        &mut self,
        function: FunctionId,
        node: NodeId,
    ) -> Result<FunctionNodeId, StorageError> {
        require(&self.functions, function)?;
        require(&self.nodes, node)?;
        if self
            .function_nodes
            .any(|l| l.function_id == function && l.node_id == node)
        {
            return Err(StorageError::duplicate(
                EntityKind::FunctionNode,
                format!("{}->{}", function, node),
            ));
        }
        let id = self.function_nodes.next_id();
        self.function_nodes.insert(FunctionNodeRecord {
            id,
            function_id: function,
            node_id: node,
        });
        Ok(id)
    }

    fn get_function_node(&self, id: FunctionNodeId) -> Result<FunctionNodeRecord, StorageError> {
        self.function_nodes.get(id)
    }

    fn list_function_nodes(
        &self,
        filter: &FunctionNodeFilter,
    ) -> Result<Vec<FunctionNodeRecord>, StorageError> {
        Ok(self.function_nodes.select(|l| {
            matches_opt(&filter.function, &l.function_id) && matches_opt(&filter.node, &l.node_id)
        }))
    }

    fn delete_function_node(&mut self, id: FunctionNodeId) -> Result<(), StorageError> {
        self.function_nodes.get(id)?;
        restrict(
            EntityKind::FunctionNode,
            id,
            EntityKind::FunctionNodeArg,
            self.function_node_args.any(|a| a.function_node_id == id),
        )?;
        self.function_nodes.remove(id)?;
        Ok(())
    }

    fn insert_function_node_arg(
        &mut self,
        link: FunctionNodeId,
        arg: &str,
    ) -> Result<FunctionNodeArgId, StorageError> {
        require(&self.function_nodes, link)?;
        let id = self.function_node_args.next_id();
        self.function_node_args.insert(FunctionNodeArgRecord {
            id,
            function_node_id: link,
            arg: arg.to_string(),
        });
        Ok(id)
    }

    fn list_function_node_args(
        &self,
        link: FunctionNodeId,
    ) -> Result<Vec<FunctionNodeArgRecord>, StorageError> {
        Ok(self.function_node_args.select(|a| a.function_node_id == link))
    }

    fn delete_function_node_args(&mut self, link: FunctionNodeId) -> Result<usize, StorageError> {
        Ok(self.function_node_args.remove_where(|a| a.function_node_id == link))
    }

    // -------------------------------------------------------------------
    // Program-graph links
    // -------------------------------------------------------------------

    fn insert_program_graph(
        &mut self,
        program: ProgramId,
        graph: GraphId,
    ) -> Result<ProgramGraphId, StorageError> {
        require(&self.programs, program)?;
        require(&self.graphs, graph)?;
        if self
            .program_graphs
            .any(|l| l.program_id == program && l.graph_id == graph)
        {
            return Err(StorageError::duplicate(
                EntityKind::ProgramGraph,
                format!("{}->{}", program, graph),
            ));
        }
        let id = self.program_graphs.next_id();
        self.program_graphs.insert(ProgramGraphRecord {
            id,
            program_id: program,
            graph_id: graph,
        });
        Ok(id)
    }

    fn get_program_graph(&self, id: ProgramGraphId) -> Result<ProgramGraphRecord, StorageError> {
        self.program_graphs.get(id)
    }

    fn list_program_graphs(
        &self,
        filter: &ProgramGraphFilter,
    ) -> Result<Vec<ProgramGraphRecord>, StorageError> {
        Ok(self.program_graphs.select(|l| {
            matches_opt(&filter.program, &l.program_id) && matches_opt(&filter.graph, &l.graph_id)
        }))
    }

    fn delete_program_graph(&mut self, id: ProgramGraphId) -> Result<(), StorageError> {
        self.program_graphs.remove(id)?;
        Ok(())
    }

    // -------------------------------------------------------------------
    // Node placements
    // -------------------------------------------------------------------

    fn insert_node_graph(&mut self, placement: &NewNodeGraph) -> Result<NodeGraphId, StorageError> {
        require(&self.nodes, placement.node_id)?;
        require(&self.graphs, placement.graph_id)?;
        if let Some(parent) = placement.parent_id {
            require(&self.node_graphs, parent)?;
        }
        let graph = placement.graph_id;
        let taken = self.node_graphs.any(|ng| {
            ng.graph_id == graph
                && (ng.name == placement.name
                    || (placement.parent_id.is_none() && ng.parent_id.is_none()))
        });
        if taken {
            return Err(StorageError::duplicate(EntityKind::NodeGraph, &placement.name));
        }
        let id = self.node_graphs.next_id();
        self.node_graphs.insert(NodeGraphRecord {
            id,
            name: placement.name.clone(),
            node_id: placement.node_id,
            graph_id: placement.graph_id,
            parent_id: placement.parent_id,
        });
        Ok(id)
    }

    fn get_node_graph(&self, id: NodeGraphId) -> Result<NodeGraphRecord, StorageError> {
        self.node_graphs.get(id)
    }

    fn list_node_graphs(
        &self,
        filter: &NodeGraphFilter,
    ) -> Result<Vec<NodeGraphRecord>, StorageError> {
        Ok(self.node_graphs.select(|ng| {
            matches_opt(&filter.node, &ng.node_id)
                && matches_opt(&filter.graph, &ng.graph_id)
                && matches_opt(&filter.name, &ng.name)
                && (!filter.roots_only || ng.parent_id.is_none())
        }))
    }

    fn delete_node_graph(&mut self, id: NodeGraphId) -> Result<(), StorageError> {
        self.node_graphs.get(id)?;
        restrict(
            EntityKind::NodeGraph,
            id,
            EntityKind::NodeGraph,
            self.node_graphs.any(|ng| ng.parent_id == Some(id)),
        )?;
        self.node_graphs.remove(id)?;
        Ok(())
    }
}
