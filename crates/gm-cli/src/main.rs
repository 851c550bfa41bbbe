//! Genetic-method catalog CLI.
//!
//! Provides the `gm` binary for working with a catalog database directly,
//! without running the HTTP server:
//!
//! - `seed` applies a JSON snapshot
//! - `show` prints the composed view of a program, graph or node
//! - `functions` lists functions, optionally filtered
//!
//! Uses the same `CatalogService` as the HTTP server, so every rule applies
//! identically from both entry points.

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use gm_core::{FunctionType, RefKey};
use gm_server::service::{CatalogError, CatalogService, FunctionQuery, Snapshot};
use gm_storage::SqliteStore;

/// Genetic-method catalog tools.
#[derive(Parser)]
#[command(name = "gm", about = "Genetic-method catalog tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// What `show` composes.
#[derive(Clone, Copy, ValueEnum)]
enum Target {
    Program,
    Graph,
    Node,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Apply a JSON snapshot to the catalog.
    Seed {
        /// Path to the catalog database file.
        #[arg(short, long)]
        db: String,

        /// Snapshot file to apply.
        #[arg(short, long)]
        snapshot: std::path::PathBuf,
    },

    /// Print the composed view of an entity as JSON.
    Show {
        /// Path to the catalog database file.
        #[arg(short, long)]
        db: String,

        #[arg(value_enum)]
        target: Target,

        /// Entity id or name.
        key: String,
    },

    /// List functions as JSON.
    Functions {
        /// Path to the catalog database file.
        #[arg(short, long)]
        db: String,

        /// Only functions with this role (e.g. `fitness`, `mutation`).
        #[arg(long = "type")]
        function_type: Option<FunctionType>,

        /// Only functions with this gene type.
        #[arg(long)]
        gene_type: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Seed { db, snapshot } => run_seed(&db, &snapshot),
        Commands::Show { db, target, key } => run_show(&db, target, &key),
        Commands::Functions {
            db,
            function_type,
            gene_type,
        } => run_functions(&db, function_type, gene_type),
    };
    process::exit(exit_code);
}

/// Exit codes: 0 = success, 1 = rejected by the catalog, 3 = I/O error.
fn exit_code(err: &CatalogError) -> i32 {
    match err {
        CatalogError::Storage(_) => 3,
        _ => 1,
    }
}

fn open(db_path: &str) -> Result<CatalogService<SqliteStore>, i32> {
    CatalogService::open(db_path).map_err(|e| {
        eprintln!("Error: failed to open database '{}': {}", db_path, e);
        3
    })
}

fn print_json(value: &impl Serialize) {
    let json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize result: {}\"}}", e));
    println!("{}", json);
}

/// Execute the seed subcommand.
///
/// Entries the catalog rejects are skipped and counted; they do not fail
/// the command.
fn run_seed(db_path: &str, snapshot_path: &std::path::Path) -> i32 {
    let raw = match std::fs::read_to_string(snapshot_path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", snapshot_path.display(), e);
            return 3;
        }
    };
    let snapshot = match Snapshot::from_json(&raw) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("Error: invalid snapshot '{}': {}", snapshot_path.display(), e);
            return 1;
        }
    };
    let mut service = match open(db_path) {
        Ok(service) => service,
        Err(code) => return code,
    };
    let report = service.apply_snapshot(&snapshot);
    print_json(&report);
    0
}

/// Execute the show subcommand.
fn run_show(db_path: &str, target: Target, key: &str) -> i32 {
    let mut service = match open(db_path) {
        Ok(service) => service,
        Err(code) => return code,
    };
    let key = match key.parse::<RefKey>() {
        Ok(key) => key,
        Err(never) => match never {},
    };
    let shown = match target {
        Target::Program => service.compose_program(&key.into_ref()).map(|v| print_json(&v)),
        Target::Graph => service.compose_graph(&key.into_ref()).map(|v| print_json(&v)),
        Target::Node => service.compose_node(&key.into_ref()).map(|v| print_json(&v)),
    };
    match shown {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_code(&e)
        }
    }
}

/// Execute the functions subcommand.
fn run_functions(db_path: &str, function_type: Option<FunctionType>, gene_type: Option<String>) -> i32 {
    let mut service = match open(db_path) {
        Ok(service) => service,
        Err(code) => return code,
    };
    let query = FunctionQuery {
        function_type,
        gene_type,
        node: None,
    };
    match service.list_functions(&query) {
        Ok(functions) => {
            print_json(&functions);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_code(&e)
        }
    }
}
