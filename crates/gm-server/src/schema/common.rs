//! Shared response shapes and path-key parsing.

use gm_core::{Entity, EntityRef, RefKey};
use serde::Serialize;

/// Response carrying the id of a created row.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedResponse<I> {
    pub id: I,
}

/// Response carrying the ids of rows created by a bulk post.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedManyResponse<I> {
    pub ids: Vec<I>,
}

/// Response from a detach; `removed` counts the links or placements removed.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub removed: usize,
}

impl DeleteResponse {
    pub fn removed(removed: usize) -> Self {
        DeleteResponse {
            success: true,
            removed,
        }
    }
}

/// Parses a path segment or query value into a reference: integers are ids,
/// anything else is a name.
pub fn parse_ref<E: Entity>(raw: &str) -> EntityRef<E> {
    match raw.parse::<RefKey>() {
        Ok(key) => key.into_ref(),
        Err(never) => match never {},
    }
}

/// Parses an optional query value into a reference.
pub fn parse_opt_ref<E: Entity>(raw: Option<&str>) -> Option<EntityRef<E>> {
    raw.map(parse_ref)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gm_core::{NodeId, NodeRecord};

    #[test]
    fn numeric_segments_are_ids() {
        assert_eq!(parse_ref::<NodeRecord>("4"), EntityRef::Id(NodeId(4)));
        assert_eq!(parse_ref::<NodeRecord>("k1"), EntityRef::Name("k1".into()));
        assert_eq!(parse_opt_ref::<NodeRecord>(None), None);
    }
}
