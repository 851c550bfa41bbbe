//! SQLite implementation of [`CatalogStore`].
//!
//! [`SqliteStore`] persists the catalog in a SQLite database with WAL mode,
//! enforced foreign keys, and automatic schema migrations. Uniqueness and
//! referential rules live in the schema; constraint failures are translated
//! into [`StorageError::Duplicate`] and [`StorageError::IntegrityError`].

use std::fmt;
use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

use gm_core::*;

use crate::error::StorageError;
use crate::traits::CatalogStore;
use crate::types::{
    FunctionFilter, FunctionNodeFilter, NodeFilter, NodeGraphFilter, ProgramGraphFilter,
};

/// SQLite-backed implementation of [`CatalogStore`].
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) a SQLite database at `path`.
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let conn = crate::schema::open_database(path)?;
        Ok(SqliteStore { conn })
    }

    /// Opens an in-memory SQLite database.
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = crate::schema::open_in_memory()?;
        Ok(SqliteStore { conn })
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn get_row<T, F>(&self, sql: &str, id: i64, kind: EntityKind, map: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.conn.prepare_cached(sql)?;
        stmt.query_row(params![id], map)
            .optional()
            .map_err(read_err)?
            .ok_or_else(|| StorageError::not_found(kind, id))
    }

    fn find_row<T, F>(&self, sql: &str, name: &str, map: F) -> Result<Option<T>, StorageError>
    where
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.conn.prepare_cached(sql)?;
        stmt.query_row(params![name], map).optional().map_err(read_err)
    }

    fn insert_row(
        &mut self,
        sql: &str,
        params: impl rusqlite::Params,
        kind: EntityKind,
        key: impl fmt::Display,
    ) -> Result<i64, StorageError> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        stmt.execute(params).map_err(|e| write_err(e, kind, &key))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn delete_row(&mut self, table: &str, id: i64, kind: EntityKind) -> Result<(), StorageError> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", table);
        let affected = self
            .conn
            .execute(&sql, params![id])
            .map_err(|e| write_err(e, kind, id))?;
        if affected == 0 {
            return Err(StorageError::not_found(kind, id));
        }
        Ok(())
    }
}

/// Collects mapped rows, translating conversion failures.
fn collect<T>(
    rows: impl Iterator<Item = rusqlite::Result<T>>,
) -> Result<Vec<T>, StorageError> {
    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(read_err)?);
    }
    Ok(result)
}

/// A column that fails to convert means the stored data is inconsistent.
fn read_err(err: rusqlite::Error) -> StorageError {
    match err {
        rusqlite::Error::FromSqlConversionFailure(idx, _, source) => {
            StorageError::integrity(format!("column {}: {}", idx, source))
        }
        other => StorageError::Sqlite(other),
    }
}

fn write_err(err: rusqlite::Error, kind: EntityKind, key: impl fmt::Display) -> StorageError {
    if let rusqlite::Error::SqliteFailure(code, Some(message)) = &err {
        if code.code == ErrorCode::ConstraintViolation {
            if message.contains("FOREIGN KEY constraint failed") {
                return StorageError::integrity(format!("{} {}: {}", kind, key, message));
            }
            if message.contains("UNIQUE constraint failed")
                || message.contains("PRIMARY KEY constraint failed")
            {
                return StorageError::duplicate(kind, key);
            }
        }
    }
    StorageError::Sqlite(err)
}

/// Parses an enum stored as TEXT.
fn parse_text<T>(idx: usize, raw: String) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

// ---------------------------------------------------------------------------
// Row mappers
// ---------------------------------------------------------------------------

fn program_from_row(row: &Row<'_>) -> rusqlite::Result<ProgramRecord> {
    Ok(ProgramRecord {
        id: ProgramId(row.get(0)?),
        name: row.get(1)?,
    })
}

fn graph_from_row(row: &Row<'_>) -> rusqlite::Result<GraphRecord> {
    Ok(GraphRecord {
        id: GraphId(row.get(0)?),
        name: row.get(1)?,
    })
}

fn node_from_row(row: &Row<'_>) -> rusqlite::Result<NodeRecord> {
    Ok(NodeRecord {
        id: NodeId(row.get(0)?),
        name: row.get(1)?,
        node_type: parse_text(2, row.get(2)?)?,
        gene_type: row.get(3)?,
    })
}

fn function_from_row(row: &Row<'_>) -> rusqlite::Result<FunctionRecord> {
    Ok(FunctionRecord {
        id: FunctionId(row.get(0)?),
        name: row.get(1)?,
        function_type: parse_text(2, row.get(2)?)?,
        gene_type: row.get(3)?,
        code: row.get(4)?,
    })
}

fn param_from_row(row: &Row<'_>) -> rusqlite::Result<FunctionParamRecord> {
    Ok(FunctionParamRecord {
        id: FunctionParamId(row.get(0)?),
        function_id: FunctionId(row.get(1)?),
        name: row.get(2)?,
        param_type: row.get(3)?,
        is_const: row.get(4)?,
        is_ref: row.get(5)?,
    })
}

fn library_from_row(row: &Row<'_>) -> rusqlite::Result<LibraryRecord> {
    Ok(LibraryRecord {
        id: LibraryId(row.get(0)?),
        program_id: ProgramId(row.get(1)?),
        name: row.get(2)?,
        is_stl: row.get(3)?,
    })
}

fn global_var_from_row(row: &Row<'_>) -> rusqlite::Result<GlobalVarRecord> {
    Ok(GlobalVarRecord {
        id: GlobalVarId(row.get(0)?),
        program_id: ProgramId(row.get(1)?),
        name: row.get(2)?,
        var_type: row.get(3)?,
        is_const: row.get(4)?,
    })
}

fn function_node_from_row(row: &Row<'_>) -> rusqlite::Result<FunctionNodeRecord> {
    Ok(FunctionNodeRecord {
        id: FunctionNodeId(row.get(0)?),
        function_id: FunctionId(row.get(1)?),
        node_id: NodeId(row.get(2)?),
    })
}

fn program_graph_from_row(row: &Row<'_>) -> rusqlite::Result<ProgramGraphRecord> {
    Ok(ProgramGraphRecord {
        id: ProgramGraphId(row.get(0)?),
        program_id: ProgramId(row.get(1)?),
        graph_id: GraphId(row.get(2)?),
    })
}

fn node_graph_from_row(row: &Row<'_>) -> rusqlite::Result<NodeGraphRecord> {
    let parent: Option<i64> = row.get(4)?;
    Ok(NodeGraphRecord {
        id: NodeGraphId(row.get(0)?),
        name: row.get(1)?,
        node_id: NodeId(row.get(2)?),
        graph_id: GraphId(row.get(3)?),
        parent_id: parent.map(NodeGraphId),
    })
}

const PROGRAM_COLUMNS: &str = "SELECT id, name FROM programs";
const GRAPH_COLUMNS: &str = "SELECT id, name FROM graphs";
const NODE_COLUMNS: &str = "SELECT id, name, node_type, gene_type FROM nodes";
const FUNCTION_COLUMNS: &str = "SELECT id, name, function_type, gene_type, code FROM functions";
const PARAM_COLUMNS: &str =
    "SELECT id, function_id, name, param_type, is_const, is_ref FROM function_params";
const LIBRARY_COLUMNS: &str = "SELECT id, program_id, name, is_stl FROM libraries";
const GLOBAL_VAR_COLUMNS: &str =
    "SELECT id, program_id, name, var_type, is_const FROM global_vars";
const FUNCTION_NODE_COLUMNS: &str = "SELECT id, function_id, node_id FROM function_nodes";
const PROGRAM_GRAPH_COLUMNS: &str = "SELECT id, program_id, graph_id FROM program_graphs";
const NODE_GRAPH_COLUMNS: &str = "SELECT id, name, node_id, graph_id, parent_id FROM node_graphs";

impl CatalogStore for SqliteStore {
    fn atomically<T, E, F>(&mut self, op: F) -> Result<T, E>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<StorageError> + fmt::Display,
    {
        self.conn
            .execute_batch("SAVEPOINT catalog_op")
            .map_err(StorageError::from)?;
        match op(self) {
            Ok(value) => {
                self.conn
                    .execute_batch("RELEASE catalog_op")
                    .map_err(StorageError::from)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(source) = self
                    .conn
                    .execute_batch("ROLLBACK TO catalog_op; RELEASE catalog_op")
                {
                    return Err(StorageError::RollbackFailed {
                        original: err.to_string(),
                        source,
                    }
                    .into());
                }
                Err(err)
            }
        }
    }

    // -------------------------------------------------------------------
    // Programs
    // -------------------------------------------------------------------

    fn insert_program(&mut self, program: &NewProgram) -> Result<ProgramId, StorageError> {
        let id = self.insert_row(
            "INSERT INTO programs (name) VALUES (?1)",
            params![program.name],
            EntityKind::Program,
            &program.name,
        )?;
        Ok(ProgramId(id))
    }

    fn get_program(&self, id: ProgramId) -> Result<ProgramRecord, StorageError> {
        let sql = format!("{} WHERE id = ?1", PROGRAM_COLUMNS);
        self.get_row(&sql, id.0, EntityKind::Program, program_from_row)
    }

    fn find_program(&self, name: &str) -> Result<Option<ProgramRecord>, StorageError> {
        let sql = format!("{} WHERE name = ?1", PROGRAM_COLUMNS);
        self.find_row(&sql, name, program_from_row)
    }

    fn list_programs(&self) -> Result<Vec<ProgramRecord>, StorageError> {
        let sql = format!("{} ORDER BY id", PROGRAM_COLUMNS);
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map([], program_from_row)?;
        collect(rows)
    }

    fn delete_program(&mut self, id: ProgramId) -> Result<(), StorageError> {
        self.delete_row("programs", id.0, EntityKind::Program)
    }

    // -------------------------------------------------------------------
    // Graphs
    // -------------------------------------------------------------------

    fn insert_graph(&mut self, graph: &NewGraph) -> Result<GraphId, StorageError> {
        let id = self.insert_row(
            "INSERT INTO graphs (name) VALUES (?1)",
            params![graph.name],
            EntityKind::Graph,
            &graph.name,
        )?;
        Ok(GraphId(id))
    }

    fn get_graph(&self, id: GraphId) -> Result<GraphRecord, StorageError> {
        let sql = format!("{} WHERE id = ?1", GRAPH_COLUMNS);
        self.get_row(&sql, id.0, EntityKind::Graph, graph_from_row)
    }

    fn find_graph(&self, name: &str) -> Result<Option<GraphRecord>, StorageError> {
        let sql = format!("{} WHERE name = ?1", GRAPH_COLUMNS);
        self.find_row(&sql, name, graph_from_row)
    }

    fn list_graphs(&self) -> Result<Vec<GraphRecord>, StorageError> {
        let sql = format!("{} ORDER BY id", GRAPH_COLUMNS);
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map([], graph_from_row)?;
        collect(rows)
    }

    fn delete_graph(&mut self, id: GraphId) -> Result<(), StorageError> {
        self.delete_row("graphs", id.0, EntityKind::Graph)
    }

    // -------------------------------------------------------------------
    // Nodes
    // -------------------------------------------------------------------

    fn insert_node(&mut self, node: &NewNode) -> Result<NodeId, StorageError> {
        let id = self.insert_row(
            "INSERT INTO nodes (name, node_type, gene_type) VALUES (?1, ?2, ?3)",
            params![node.name, node.node_type.as_str(), node.gene_type],
            EntityKind::Node,
            &node.name,
        )?;
        Ok(NodeId(id))
    }

    fn get_node(&self, id: NodeId) -> Result<NodeRecord, StorageError> {
        let sql = format!("{} WHERE id = ?1", NODE_COLUMNS);
        self.get_row(&sql, id.0, EntityKind::Node, node_from_row)
    }

    fn find_node(&self, name: &str) -> Result<Option<NodeRecord>, StorageError> {
        let sql = format!("{} WHERE name = ?1", NODE_COLUMNS);
        self.find_row(&sql, name, node_from_row)
    }

    fn list_nodes(&self, filter: &NodeFilter) -> Result<Vec<NodeRecord>, StorageError> {
        let sql = format!(
            "{} WHERE (?1 IS NULL OR node_type = ?1) AND (?2 IS NULL OR gene_type = ?2) ORDER BY id",
            NODE_COLUMNS
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(
            params![filter.node_type.map(|t| t.as_str()), filter.gene_type],
            node_from_row,
        )?;
        collect(rows)
    }

    fn delete_node(&mut self, id: NodeId) -> Result<(), StorageError> {
        self.delete_row("nodes", id.0, EntityKind::Node)
    }

    // -------------------------------------------------------------------
    // Functions and their parameters
    // -------------------------------------------------------------------

    fn insert_function(&mut self, function: &NewFunction) -> Result<FunctionId, StorageError> {
        let id = self.insert_row(
            "INSERT INTO functions (name, function_type, gene_type, code) VALUES (?1, ?2, ?3, ?4)",
            params![
                function.name,
                function.function_type.as_str(),
                function.gene_type,
                function.code,
            ],
            EntityKind::Function,
            &function.name,
        )?;
        Ok(FunctionId(id))
    }

    fn get_function(&self, id: FunctionId) -> Result<FunctionRecord, StorageError> {
        let sql = format!("{} WHERE id = ?1", FUNCTION_COLUMNS);
        self.get_row(&sql, id.0, EntityKind::Function, function_from_row)
    }

    fn find_function(&self, name: &str) -> Result<Option<FunctionRecord>, StorageError> {
        let sql = format!("{} WHERE name = ?1", FUNCTION_COLUMNS);
        self.find_row(&sql, name, function_from_row)
    }

    fn list_functions(&self, filter: &FunctionFilter) -> Result<Vec<FunctionRecord>, StorageError> {
        let sql = format!(
            "{} WHERE (?1 IS NULL OR function_type = ?1) AND (?2 IS NULL OR gene_type = ?2) ORDER BY id",
            FUNCTION_COLUMNS
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(
            params![filter.function_type.map(|t| t.as_str()), filter.gene_type],
            function_from_row,
        )?;
        collect(rows)
    }

    fn delete_function(&mut self, id: FunctionId) -> Result<(), StorageError> {
        self.delete_row("functions", id.0, EntityKind::Function)
    }

    fn insert_function_param(
        &mut self,
        function: FunctionId,
        param: &NewFunctionParam,
    ) -> Result<FunctionParamId, StorageError> {
        let id = self.insert_row(
            "INSERT INTO function_params (function_id, name, param_type, is_const, is_ref) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                function.0,
                param.name,
                param.param_type,
                param.is_const,
                param.is_ref,
            ],
            EntityKind::FunctionParam,
            &param.name,
        )?;
        Ok(FunctionParamId(id))
    }

    fn get_function_param(&self, id: FunctionParamId) -> Result<FunctionParamRecord, StorageError> {
        let sql = format!("{} WHERE id = ?1", PARAM_COLUMNS);
        self.get_row(&sql, id.0, EntityKind::FunctionParam, param_from_row)
    }

    fn list_function_params(
        &self,
        function: FunctionId,
    ) -> Result<Vec<FunctionParamRecord>, StorageError> {
        let sql = format!("{} WHERE function_id = ?1 ORDER BY id", PARAM_COLUMNS);
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params![function.0], param_from_row)?;
        collect(rows)
    }

    fn delete_function_params(&mut self, function: FunctionId) -> Result<usize, StorageError> {
        let affected = self.conn.execute(
            "DELETE FROM function_params WHERE function_id = ?1",
            params![function.0],
        )?;
        Ok(affected)
    }

    // -------------------------------------------------------------------
    // Program-owned rows
    // -------------------------------------------------------------------

    fn insert_library(
        &mut self,
        program: ProgramId,
        library: &NewLibrary,
    ) -> Result<LibraryId, StorageError> {
        let id = self.insert_row(
            "INSERT INTO libraries (program_id, name, is_stl) VALUES (?1, ?2, ?3)",
            params![program.0, library.name, library.is_stl],
            EntityKind::Library,
            &library.name,
        )?;
        Ok(LibraryId(id))
    }

    fn get_library(&self, id: LibraryId) -> Result<LibraryRecord, StorageError> {
        let sql = format!("{} WHERE id = ?1", LIBRARY_COLUMNS);
        self.get_row(&sql, id.0, EntityKind::Library, library_from_row)
    }

    fn list_libraries(&self, program: ProgramId) -> Result<Vec<LibraryRecord>, StorageError> {
        let sql = format!("{} WHERE program_id = ?1 ORDER BY id", LIBRARY_COLUMNS);
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params![program.0], library_from_row)?;
        collect(rows)
    }

    fn delete_library(&mut self, id: LibraryId) -> Result<(), StorageError> {
        self.delete_row("libraries", id.0, EntityKind::Library)
    }

    fn insert_global_var(
        &mut self,
        program: ProgramId,
        var: &NewGlobalVar,
    ) -> Result<GlobalVarId, StorageError> {
        let id = self.insert_row(
            "INSERT INTO global_vars (program_id, name, var_type, is_const) VALUES (?1, ?2, ?3, ?4)",
            params![program.0, var.name, var.var_type, var.is_const],
            EntityKind::GlobalVar,
            &var.name,
        )?;
        Ok(GlobalVarId(id))
    }

    fn get_global_var(&self, id: GlobalVarId) -> Result<GlobalVarRecord, StorageError> {
        let sql = format!("{} WHERE id = ?1", GLOBAL_VAR_COLUMNS);
        self.get_row(&sql, id.0, EntityKind::GlobalVar, global_var_from_row)
    }

    fn list_global_vars(&self, program: ProgramId) -> Result<Vec<GlobalVarRecord>, StorageError> {
        let sql = format!("{} WHERE program_id = ?1 ORDER BY id", GLOBAL_VAR_COLUMNS);
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params![program.0], global_var_from_row)?;
        collect(rows)
    }

    fn delete_global_var(&mut self, id: GlobalVarId) -> Result<(), StorageError> {
        self.delete_row("global_vars", id.0, EntityKind::GlobalVar)
    }

    fn insert_global_var_arg(
        &mut self,
        var: GlobalVarId,
        arg: &str,
    ) -> Result<GlobalVarArgId, StorageError> {
        let id = self.insert_row(
            "INSERT INTO global_var_args (global_var_id, arg) VALUES (?1, ?2)",
            params![var.0, arg],
            EntityKind::GlobalVarArg,
            var,
        )?;
        Ok(GlobalVarArgId(id))
    }

    fn list_global_var_args(
        &self,
        var: GlobalVarId,
    ) -> Result<Vec<GlobalVarArgRecord>, StorageError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, global_var_id, arg FROM global_var_args WHERE global_var_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![var.0], |row| {
            Ok(GlobalVarArgRecord {
                id: GlobalVarArgId(row.get(0)?),
                global_var_id: GlobalVarId(row.get(1)?),
                arg: row.get(2)?,
            })
        })?;
        collect(rows)
    }

    fn delete_global_var_args(&mut self, var: GlobalVarId) -> Result<usize, StorageError> {
        let affected = self.conn.execute(
            "DELETE FROM global_var_args WHERE global_var_id = ?1",
            params![var.0],
        )?;
        Ok(affected)
    }

    // -------------------------------------------------------------------
    // Function-node links and their arguments
    // -------------------------------------------------------------------

    fn insert_function_node(
        &mut self,
        function: FunctionId,
        node: NodeId,
    ) -> Result<FunctionNodeId, StorageError> {
        let id = self.insert_row(
            "INSERT INTO function_nodes (function_id, node_id) VALUES (?1, ?2)",
            params![function.0, node.0],
            EntityKind::FunctionNode,
            format!("{}->{}", function, node),
        )?;
        Ok(FunctionNodeId(id))
    }

    fn get_function_node(&self, id: FunctionNodeId) -> Result<FunctionNodeRecord, StorageError> {
        let sql = format!("{} WHERE id = ?1", FUNCTION_NODE_COLUMNS);
        self.get_row(&sql, id.0, EntityKind::FunctionNode, function_node_from_row)
    }

    fn list_function_nodes(
        &self,
        filter: &FunctionNodeFilter,
    ) -> Result<Vec<FunctionNodeRecord>, StorageError> {
        let sql = format!(
            "{} WHERE (?1 IS NULL OR function_id = ?1) AND (?2 IS NULL OR node_id = ?2) ORDER BY id",
            FUNCTION_NODE_COLUMNS
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(
            params![filter.function.map(|f| f.0), filter.node.map(|n| n.0)],
            function_node_from_row,
        )?;
        collect(rows)
    }

    fn delete_function_node(&mut self, id: FunctionNodeId) -> Result<(), StorageError> {
        self.delete_row("function_nodes", id.0, EntityKind::FunctionNode)
    }

    fn insert_function_node_arg(
        &mut self,
        link: FunctionNodeId,
        arg: &str,
    ) -> Result<FunctionNodeArgId, StorageError> {
        let id = self.insert_row(
            "INSERT INTO function_node_args (function_node_id, arg) VALUES (?1, ?2)",
            params![link.0, arg],
            EntityKind::FunctionNodeArg,
            link,
        )?;
        Ok(FunctionNodeArgId(id))
    }

    fn list_function_node_args(
        &self,
        link: FunctionNodeId,
    ) -> Result<Vec<FunctionNodeArgRecord>, StorageError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, function_node_id, arg FROM function_node_args WHERE function_node_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![link.0], |row| {
            Ok(FunctionNodeArgRecord {
                id: FunctionNodeArgId(row.get(0)?),
                function_node_id: FunctionNodeId(row.get(1)?),
                arg: row.get(2)?,
            })
        })?;
        collect(rows)
    }

    fn delete_function_node_args(&mut self, link: FunctionNodeId) -> Result<usize, StorageError> {
        let affected = self.conn.execute(
            "DELETE FROM function_node_args WHERE function_node_id = ?1",
            params![link.0],
        )?;
        Ok(affected)
    }

    // -------------------------------------------------------------------
    // Program-graph links
    // -------------------------------------------------------------------

    fn insert_program_graph(
        &mut self,
        program: ProgramId,
        graph: GraphId,
    ) -> Result<ProgramGraphId, StorageError> {
        let id = self.insert_row(
            "INSERT INTO program_graphs (program_id, graph_id) VALUES (?1, ?2)",
            params![program.0, graph.0],
            EntityKind::ProgramGraph,
            format!("{}->{}", program, graph),
        )?;
        Ok(ProgramGraphId(id))
    }

    fn get_program_graph(&self, id: ProgramGraphId) -> Result<ProgramGraphRecord, StorageError> {
        let sql = format!("{} WHERE id = ?1", PROGRAM_GRAPH_COLUMNS);
        self.get_row(&sql, id.0, EntityKind::ProgramGraph, program_graph_from_row)
    }

    fn list_program_graphs(
        &self,
        filter: &ProgramGraphFilter,
    ) -> Result<Vec<ProgramGraphRecord>, StorageError> {
        let sql = format!(
            "{} WHERE (?1 IS NULL OR program_id = ?1) AND (?2 IS NULL OR graph_id = ?2) ORDER BY id",
            PROGRAM_GRAPH_COLUMNS
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(
            params![filter.program.map(|p| p.0), filter.graph.map(|g| g.0)],
            program_graph_from_row,
        )?;
        collect(rows)
    }

    fn delete_program_graph(&mut self, id: ProgramGraphId) -> Result<(), StorageError> {
        self.delete_row("program_graphs", id.0, EntityKind::ProgramGraph)
    }

    // -------------------------------------------------------------------
    // Node placements
    // -------------------------------------------------------------------

    fn insert_node_graph(&mut self, placement: &NewNodeGraph) -> Result<NodeGraphId, StorageError> {
        let id = self.insert_row(
            "INSERT INTO node_graphs (name, node_id, graph_id, parent_id) VALUES (?1, ?2, ?3, ?4)",
            params![
                placement.name,
                placement.node_id.0,
                placement.graph_id.0,
                placement.parent_id.map(|p| p.0),
            ],
            EntityKind::NodeGraph,
            &placement.name,
        )?;
        Ok(NodeGraphId(id))
    }

    fn get_node_graph(&self, id: NodeGraphId) -> Result<NodeGraphRecord, StorageError> {
        let sql = format!("{} WHERE id = ?1", NODE_GRAPH_COLUMNS);
        self.get_row(&sql, id.0, EntityKind::NodeGraph, node_graph_from_row)
    }

    fn list_node_graphs(
        &self,
        filter: &NodeGraphFilter,
    ) -> Result<Vec<NodeGraphRecord>, StorageError> {
        let sql = format!(
            "{} WHERE (?1 IS NULL OR node_id = ?1) AND (?2 IS NULL OR graph_id = ?2) \
             AND (?3 IS NULL OR name = ?3) AND (?4 = 0 OR parent_id IS NULL) ORDER BY id",
            NODE_GRAPH_COLUMNS
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(
            params![
                filter.node.map(|n| n.0),
                filter.graph.map(|g| g.0),
                filter.name,
                filter.roots_only,
            ],
            node_graph_from_row,
        )?;
        collect(rows)
    }

    fn delete_node_graph(&mut self, id: NodeGraphId) -> Result<(), StorageError> {
        self.delete_row("node_graphs", id.0, EntityKind::NodeGraph)
    }
}
