//! Stable ID newtypes for catalog entities.
//!
//! All IDs are distinct newtype wrappers over `i64` (aligned with SQLite's
//! `INTEGER PRIMARY KEY`), so that a `NodeId` cannot be accidentally used
//! where a `GraphId` is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_ids {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
            pub struct $name(pub i64);

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl From<i64> for $name {
                fn from(raw: i64) -> Self {
                    $name(raw)
                }
            }

            impl From<$name> for i64 {
                fn from(id: $name) -> Self {
                    id.0
                }
            }
        )+
    };
}

define_ids! {
    /// Program identity.
    ProgramId,
    /// Graph identity.
    GraphId,
    /// Node identity (the reusable node definition, not its placement).
    NodeId,
    /// Function identity.
    FunctionId,
    /// Parameter of a function.
    FunctionParamId,
    /// Function-to-node attachment.
    FunctionNodeId,
    /// Positional argument of a function-to-node attachment.
    FunctionNodeArgId,
    /// Global variable owned by a program.
    GlobalVarId,
    /// Constructor argument of a global variable.
    GlobalVarArgId,
    /// Library include owned by a program.
    LibraryId,
    /// Program-to-graph link.
    ProgramGraphId,
    /// Placement of a node inside a graph tree.
    NodeGraphId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_display_prints_inner_value() {
        assert_eq!(format!("{}", NodeId(7)), "7");
        assert_eq!(format!("{}", NodeGraphId(-1)), "-1");
    }

    #[test]
    fn id_conversions() {
        let id: ProgramId = 42.into();
        assert_eq!(id, ProgramId(42));
        let raw: i64 = id.into();
        assert_eq!(raw, 42);
    }

    #[test]
    fn ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&FunctionId(3)).unwrap();
        assert_eq!(json, "3");
        let back: FunctionId = serde_json::from_str("3").unwrap();
        assert_eq!(back, FunctionId(3));
    }
}
