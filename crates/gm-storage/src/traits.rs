//! The [`CatalogStore`] trait defining the storage contract for the catalog.
//!
//! Every method touches one table. Inserts enforce the same uniqueness and
//! referential constraints in every backend: a name or pair collision is
//! [`StorageError::Duplicate`], a dangling owner id or a delete that would
//! orphan dependents is [`StorageError::IntegrityError`]. Deleting owners
//! therefore requires removing dependents first; the cascade order lives in
//! the service layer.
//!
//! All backends (InMemoryStore, SqliteStore) implement this trait, ensuring
//! they are fully swappable without changing the service logic.

use std::fmt;

use gm_core::*;

use crate::error::StorageError;
use crate::types::{
    FunctionFilter, FunctionNodeFilter, NodeFilter, NodeGraphFilter, ProgramGraphFilter,
};

/// The row-level storage contract.
///
/// The trait is synchronous (not async): every operation is a short
/// transaction against a local store.
pub trait CatalogStore {
    /// Runs `op` as one all-or-nothing unit.
    ///
    /// If `op` returns an error, every write it made is undone before the
    /// error is handed back. Units may nest.
    fn atomically<T, E, F>(&mut self, op: F) -> Result<T, E>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<StorageError> + fmt::Display;

    // -------------------------------------------------------------------
    // Programs
    // -------------------------------------------------------------------

    fn insert_program(&mut self, program: &NewProgram) -> Result<ProgramId, StorageError>;

    fn get_program(&self, id: ProgramId) -> Result<ProgramRecord, StorageError>;

    fn find_program(&self, name: &str) -> Result<Option<ProgramRecord>, StorageError>;

    fn list_programs(&self) -> Result<Vec<ProgramRecord>, StorageError>;

    fn delete_program(&mut self, id: ProgramId) -> Result<(), StorageError>;

    // -------------------------------------------------------------------
    // Graphs
    // -------------------------------------------------------------------

    fn insert_graph(&mut self, graph: &NewGraph) -> Result<GraphId, StorageError>;

    fn get_graph(&self, id: GraphId) -> Result<GraphRecord, StorageError>;

    fn find_graph(&self, name: &str) -> Result<Option<GraphRecord>, StorageError>;

    fn list_graphs(&self) -> Result<Vec<GraphRecord>, StorageError>;

    fn delete_graph(&mut self, id: GraphId) -> Result<(), StorageError>;

    // -------------------------------------------------------------------
    // Nodes
    // -------------------------------------------------------------------

    fn insert_node(&mut self, node: &NewNode) -> Result<NodeId, StorageError>;

    fn get_node(&self, id: NodeId) -> Result<NodeRecord, StorageError>;

    fn find_node(&self, name: &str) -> Result<Option<NodeRecord>, StorageError>;

    fn list_nodes(&self, filter: &NodeFilter) -> Result<Vec<NodeRecord>, StorageError>;

    fn delete_node(&mut self, id: NodeId) -> Result<(), StorageError>;

    // -------------------------------------------------------------------
    // Functions and their parameters
    // -------------------------------------------------------------------

    fn insert_function(&mut self, function: &NewFunction) -> Result<FunctionId, StorageError>;

    fn get_function(&self, id: FunctionId) -> Result<FunctionRecord, StorageError>;

    fn find_function(&self, name: &str) -> Result<Option<FunctionRecord>, StorageError>;

    fn list_functions(&self, filter: &FunctionFilter) -> Result<Vec<FunctionRecord>, StorageError>;

    fn delete_function(&mut self, id: FunctionId) -> Result<(), StorageError>;

    fn insert_function_param(
        &mut self,
        function: FunctionId,
        param: &NewFunctionParam,
    ) -> Result<FunctionParamId, StorageError>;

    fn get_function_param(&self, id: FunctionParamId)
        -> Result<FunctionParamRecord, StorageError>;

    /// Parameters of a function in positional order.
    fn list_function_params(
        &self,
        function: FunctionId,
    ) -> Result<Vec<FunctionParamRecord>, StorageError>;

    /// Deletes every parameter of a function, returning how many were removed.
    fn delete_function_params(&mut self, function: FunctionId) -> Result<usize, StorageError>;

    // -------------------------------------------------------------------
    // Program-owned rows
    // -------------------------------------------------------------------

    fn insert_library(
        &mut self,
        program: ProgramId,
        library: &NewLibrary,
    ) -> Result<LibraryId, StorageError>;

    fn get_library(&self, id: LibraryId) -> Result<LibraryRecord, StorageError>;

    fn list_libraries(&self, program: ProgramId) -> Result<Vec<LibraryRecord>, StorageError>;

    fn delete_library(&mut self, id: LibraryId) -> Result<(), StorageError>;

    fn insert_global_var(
        &mut self,
        program: ProgramId,
        var: &NewGlobalVar,
    ) -> Result<GlobalVarId, StorageError>;

    fn get_global_var(&self, id: GlobalVarId) -> Result<GlobalVarRecord, StorageError>;

    fn list_global_vars(&self, program: ProgramId) -> Result<Vec<GlobalVarRecord>, StorageError>;

    fn delete_global_var(&mut self, id: GlobalVarId) -> Result<(), StorageError>;

    fn insert_global_var_arg(
        &mut self,
        var: GlobalVarId,
        arg: &str,
    ) -> Result<GlobalVarArgId, StorageError>;

    /// Arguments of a global variable in positional order.
    fn list_global_var_args(
        &self,
        var: GlobalVarId,
    ) -> Result<Vec<GlobalVarArgRecord>, StorageError>;

    fn delete_global_var_args(&mut self, var: GlobalVarId) -> Result<usize, StorageError>;

    // -------------------------------------------------------------------
    // Function-node links and their arguments
    // -------------------------------------------------------------------

    fn insert_function_node(
        &mut self,
        function: FunctionId,
        node: NodeId,
    ) -> Result<FunctionNodeId, StorageError>;

    fn get_function_node(&self, id: FunctionNodeId) -> Result<FunctionNodeRecord, StorageError>;

    fn list_function_nodes(
        &self,
        filter: &FunctionNodeFilter,
    ) -> Result<Vec<FunctionNodeRecord>, StorageError>;

    fn delete_function_node(&mut self, id: FunctionNodeId) -> Result<(), StorageError>;

    fn insert_function_node_arg(
        &mut self,
        link: FunctionNodeId,
        arg: &str,
    ) -> Result<FunctionNodeArgId, StorageError>;

    /// Arguments of a link in positional order.
    fn list_function_node_args(
        &self,
        link: FunctionNodeId,
    ) -> Result<Vec<FunctionNodeArgRecord>, StorageError>;

    fn delete_function_node_args(&mut self, link: FunctionNodeId) -> Result<usize, StorageError>;

    // -------------------------------------------------------------------
    // Program-graph links
    // -------------------------------------------------------------------

    fn insert_program_graph(
        &mut self,
        program: ProgramId,
        graph: GraphId,
    ) -> Result<ProgramGraphId, StorageError>;

    fn get_program_graph(&self, id: ProgramGraphId) -> Result<ProgramGraphRecord, StorageError>;

    fn list_program_graphs(
        &self,
        filter: &ProgramGraphFilter,
    ) -> Result<Vec<ProgramGraphRecord>, StorageError>;

    fn delete_program_graph(&mut self, id: ProgramGraphId) -> Result<(), StorageError>;

    // -------------------------------------------------------------------
    // Node placements
    // -------------------------------------------------------------------

    fn insert_node_graph(&mut self, placement: &NewNodeGraph) -> Result<NodeGraphId, StorageError>;

    fn get_node_graph(&self, id: NodeGraphId) -> Result<NodeGraphRecord, StorageError>;

    fn list_node_graphs(
        &self,
        filter: &NodeGraphFilter,
    ) -> Result<Vec<NodeGraphRecord>, StorageError>;

    /// Deletes one placement. Fails while it still has children.
    fn delete_node_graph(&mut self, id: NodeGraphId) -> Result<(), StorageError>;
}
