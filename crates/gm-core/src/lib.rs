//! Core data model for the genetic-method catalog.
//!
//! Plain data records for every stored entity, the enum vocabularies for
//! node and function roles, typed identifiers, and the [`EntityRef`] union
//! used to address an entity by id, unique name, or an already loaded record.

pub mod entity;
pub mod error;
pub mod id;
pub mod reference;
pub mod types;

// Re-export commonly used types
pub use entity::*;
pub use error::CoreError;
pub use id::*;
pub use reference::{EntityRef, RefKey};
pub use types::{EntityKind, FunctionType, NodeType};
