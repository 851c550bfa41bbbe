//! Declarative catalog snapshots.
//!
//! A [`Snapshot`] lists entities and links in dependency order. Applying it
//! runs each entry as its own unit through the regular service operations, so
//! every rule applies; an entry that fails is logged and skipped, and the rest
//! of the snapshot still goes in.

use std::fmt;

use gm_core::{NewGraph, NewNode, RefKey};
use gm_storage::CatalogStore;
use serde::{Deserialize, Serialize};

use super::{CatalogError, CatalogService};
use crate::schema::functions::CreateFunctionRequest;
use crate::schema::programs::CreateProgramRequest;

/// A function-node link, optionally with its arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedFunctionNode {
    pub function: RefKey,
    pub node: RefKey,
    #[serde(default)]
    pub args: Option<Vec<String>>,
}

/// A placement; `parent` is usually the name of an earlier placement in the
/// same graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedNodeGraph {
    pub name: String,
    pub node: RefKey,
    pub graph: RefKey,
    #[serde(default)]
    pub parent: Option<RefKey>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedProgramGraph {
    pub program: RefKey,
    pub graph: RefKey,
}

/// Everything a catalog needs to start from, applied in field order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub functions: Vec<CreateFunctionRequest>,
    #[serde(default)]
    pub nodes: Vec<NewNode>,
    #[serde(default)]
    pub graphs: Vec<NewGraph>,
    #[serde(default)]
    pub programs: Vec<CreateProgramRequest>,
    #[serde(default)]
    pub function_nodes: Vec<SeedFunctionNode>,
    #[serde(default)]
    pub node_graphs: Vec<SeedNodeGraph>,
    #[serde(default)]
    pub program_graphs: Vec<SeedProgramGraph>,
}

impl Snapshot {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
            + self.nodes.len()
            + self.graphs.len()
            + self.programs.len()
            + self.function_nodes.len()
            + self.node_graphs.len()
            + self.program_graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of applying a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub applied: usize,
    pub skipped: usize,
}

impl SeedReport {
    fn record<T>(&mut self, entry: impl fmt::Display, outcome: Result<T, CatalogError>) {
        match outcome {
            Ok(_) => self.applied += 1,
            Err(err) => {
                tracing::warn!("seed: skipping {}: {}", entry, err);
                self.skipped += 1;
            }
        }
    }
}

impl<S: CatalogStore> CatalogService<S> {
    /// Applies every entry of `snapshot`, each in its own unit.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) -> SeedReport {
        let mut report = SeedReport::default();

        for req in &snapshot.functions {
            let outcome = self.create_function(req);
            report.record(format_args!("function '{}'", req.function.name), outcome);
        }
        for node in &snapshot.nodes {
            let outcome = self.create_node(node);
            report.record(format_args!("node '{}'", node.name), outcome);
        }
        for graph in &snapshot.graphs {
            let outcome = self.create_graph(graph);
            report.record(format_args!("graph '{}'", graph.name), outcome);
        }
        for req in &snapshot.programs {
            let outcome = self.create_program(req);
            report.record(format_args!("program '{}'", req.name), outcome);
        }
        for link in &snapshot.function_nodes {
            let function = link.function.clone().into_ref();
            let node = link.node.clone().into_ref();
            let outcome = match &link.args {
                Some(args) => self.attach_function_node(&function, &node, args),
                None => self.attach_function(&function, &node),
            };
            report.record(
                format_args!("function_node {}/{}", link.function, link.node),
                outcome,
            );
        }
        for placement in &snapshot.node_graphs {
            let outcome = self.attach_node_graph(
                &placement.name,
                &placement.node.clone().into_ref(),
                &placement.graph.clone().into_ref(),
                placement.parent.as_ref(),
            );
            report.record(
                format_args!("node_graph '{}' in {}", placement.name, placement.graph),
                outcome,
            );
        }
        for link in &snapshot.program_graphs {
            let outcome = self.attach_program_graph(
                &link.program.clone().into_ref(),
                &link.graph.clone().into_ref(),
            );
            report.record(
                format_args!("program_graph {}/{}", link.program, link.graph),
                outcome,
            );
        }

        tracing::info!(
            "seed applied {} entr(ies), skipped {}",
            report.applied,
            report.skipped
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gm_core::EntityRef;

    const SNAPSHOT: &str = r#"{
        "functions": [
            {"name": "fit", "type": "fitness", "gene_type": "int", "code": "",
             "params": [{"name": "target", "type": "int"}]},
            {"name": "pool", "type": "pooling_populations", "gene_type": "int"}
        ],
        "nodes": [
            {"name": "pop", "type": "population_node", "gene_type": "int"},
            {"name": "merge", "type": "K_node", "gene_type": "int"}
        ],
        "graphs": [{"name": "main"}],
        "programs": [{"name": "ga", "libraries": [{"name": "vector", "is_stl": true}]}],
        "function_nodes": [
            {"function": "fit", "node": "pop", "args": ["100"]},
            {"function": "pool", "node": "pop"},
            {"function": "pool", "node": "merge"}
        ],
        "node_graphs": [
            {"name": "root", "node": "merge", "graph": "main"},
            {"name": "left", "node": "pop", "graph": "main", "parent": "root"}
        ],
        "program_graphs": [{"program": "ga", "graph": "main"}]
    }"#;

    #[test]
    fn applies_entries_and_skips_rejected_ones() {
        let snapshot = Snapshot::from_json(SNAPSHOT).unwrap();
        assert_eq!(snapshot.len(), 12);

        let mut svc = CatalogService::in_memory();
        let report = svc.apply_snapshot(&snapshot);
        // pool cannot live on a population node
        assert_eq!(report, SeedReport { applied: 11, skipped: 1 });

        let view = svc.compose_program(&EntityRef::name("ga")).unwrap();
        assert_eq!(view.graphs[0].edges.len(), 2);
        let pop = svc.compose_node(&EntityRef::name("pop")).unwrap();
        assert_eq!(pop.functions[0].params[0].arg.as_deref(), Some("100"));
    }

    #[test]
    fn reapplying_skips_everything() {
        let snapshot = Snapshot::from_json(SNAPSHOT).unwrap();
        let mut svc = CatalogService::in_memory();
        svc.apply_snapshot(&snapshot);

        let again = svc.apply_snapshot(&snapshot);
        assert_eq!(again.applied, 0);
        assert_eq!(again.skipped, 12);
    }

    #[test]
    fn empty_document_is_an_empty_snapshot() {
        let snapshot = Snapshot::from_json("{}").unwrap();
        assert!(snapshot.is_empty());
    }
}
