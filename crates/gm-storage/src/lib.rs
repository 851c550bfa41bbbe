//! Storage abstraction for the genetic-method catalog.
//!
//! Provides the [`CatalogStore`] trait defining the row-level contract that
//! all backends implement, plus the [`InMemoryStore`] and [`SqliteStore`] as
//! first-class backends.
//!
//! # Architecture
//!
//! Each trait method reads or writes rows of exactly one table. Relationship
//! rules (validation, cascades, composition) live above this layer and are
//! expressed in terms of these primitives, so both backends behave the same.
//! [`CatalogStore::atomically`] wraps a group of primitives into one
//! all-or-nothing unit.
//!
//! # Modules
//!
//! - [`error`]: StorageError enum with all failure modes
//! - [`types`]: row filters for list queries
//! - [`traits`]: CatalogStore trait definition
//! - [`repository`]: resolution of entity references into records
//! - [`memory`]: InMemoryStore implementation
//! - [`schema`]: SQL schema migrations
//! - [`sqlite`]: SqliteStore implementation

pub mod error;
pub mod memory;
pub mod repository;
pub mod schema;
pub mod sqlite;
pub mod traits;
pub mod types;

// Re-export key types for ergonomic use.
pub use error::StorageError;
pub use memory::InMemoryStore;
pub use repository::{resolve, resolve_id, Stored};
pub use sqlite::SqliteStore;
pub use traits::CatalogStore;
pub use types::{FunctionFilter, FunctionNodeFilter, NodeFilter, NodeGraphFilter, ProgramGraphFilter};
