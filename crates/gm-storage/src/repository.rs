//! Resolution of [`EntityRef`]s into stored records.
//!
//! A reference is resolved once, at the edge of an operation; everything past
//! that point works with concrete records and ids.

use gm_core::*;

use crate::error::StorageError;
use crate::traits::CatalogStore;

/// A record kind that can be loaded from a [`CatalogStore`].
pub trait Stored: Entity + Sized {
    fn load<S: CatalogStore>(store: &S, id: Self::Id) -> Result<Self, StorageError>;

    /// Looks a record up by its unique name. Kinds without unique names
    /// never match.
    fn load_by_name<S: CatalogStore>(_store: &S, _name: &str) -> Result<Option<Self>, StorageError> {
        Ok(None)
    }
}

macro_rules! impl_stored {
    ($($record:ident => $get:ident $(, $find:ident)?;)+) => {
        $(
            impl Stored for $record {
                fn load<S: CatalogStore>(store: &S, id: Self::Id) -> Result<Self, StorageError> {
                    store.$get(id)
                }

                $(
                    fn load_by_name<S: CatalogStore>(
                        store: &S,
                        name: &str,
                    ) -> Result<Option<Self>, StorageError> {
                        store.$find(name)
                    }
                )?
            }
        )+
    };
}

impl_stored! {
    ProgramRecord => get_program, find_program;
    GraphRecord => get_graph, find_graph;
    NodeRecord => get_node, find_node;
    FunctionRecord => get_function, find_function;
    FunctionParamRecord => get_function_param;
    GlobalVarRecord => get_global_var;
    LibraryRecord => get_library;
    FunctionNodeRecord => get_function_node;
    ProgramGraphRecord => get_program_graph;
    NodeGraphRecord => get_node_graph;
}

/// Resolves a reference into its record.
///
/// An `Instance` is returned as given; it is not re-read from the store.
pub fn resolve<E, S>(store: &S, reference: &EntityRef<E>) -> Result<E, StorageError>
where
    E: Stored,
    S: CatalogStore,
{
    match reference {
        EntityRef::Id(id) => E::load(store, *id),
        EntityRef::Name(name) => E::load_by_name(store, name)?
            .ok_or_else(|| StorageError::not_found(E::KIND, name)),
        EntityRef::Instance(entity) => Ok(entity.clone()),
    }
}

/// Resolves a reference into an id without loading the record when the id is
/// already known.
pub fn resolve_id<E, S>(store: &S, reference: &EntityRef<E>) -> Result<E::Id, StorageError>
where
    E: Stored,
    S: CatalogStore,
{
    match reference {
        EntityRef::Id(id) => Ok(*id),
        EntityRef::Instance(entity) => Ok(entity.id()),
        EntityRef::Name(name) => E::load_by_name(store, name)?
            .map(|e| e.id())
            .ok_or_else(|| StorageError::not_found(E::KIND, name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;

    fn store_with_node() -> (InMemoryStore, NodeId) {
        let mut store = InMemoryStore::new();
        let id = store
            .insert_node(&NewNode {
                name: "n1".into(),
                node_type: NodeType::KNode,
                gene_type: "int".into(),
            })
            .unwrap();
        (store, id)
    }

    #[test]
    fn resolves_by_id_and_name() {
        let (store, id) = store_with_node();

        let by_id = resolve(&store, &EntityRef::<NodeRecord>::id(id)).unwrap();
        let by_name = resolve(&store, &EntityRef::<NodeRecord>::name("n1")).unwrap();
        assert_eq!(by_id, by_name);
        assert_eq!(by_id.node_type, NodeType::KNode);
    }

    #[test]
    fn unknown_name_is_not_found() {
        let (store, _) = store_with_node();
        let err = resolve(&store, &EntityRef::<NodeRecord>::name("missing")).unwrap_err();
        assert!(matches!(
            err,
            StorageError::NotFound { kind: EntityKind::Node, ref key } if key == "missing"
        ));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let (store, _) = store_with_node();
        let err = resolve(&store, &EntityRef::<NodeRecord>::id(99i64)).unwrap_err();
        assert!(matches!(err, StorageError::NotFound { kind: EntityKind::Node, .. }));
    }

    #[test]
    fn instance_resolves_without_lookup() {
        let store = InMemoryStore::new();
        let record = GraphRecord {
            id: GraphId(42),
            name: "detached".into(),
        };
        let resolved = resolve(&store, &EntityRef::instance(record.clone())).unwrap();
        assert_eq!(resolved, record);
        assert_eq!(
            resolve_id(&store, &EntityRef::instance(record)).unwrap(),
            GraphId(42)
        );
    }

    #[test]
    fn id_references_resolve_to_ids_without_lookup() {
        let store = InMemoryStore::new();
        assert_eq!(
            resolve_id(&store, &EntityRef::<ProgramRecord>::id(7i64)).unwrap(),
            ProgramId(7)
        );
    }

    #[test]
    fn names_do_not_address_unnamed_kinds() {
        let store = InMemoryStore::new();
        let err = resolve(&store, &EntityRef::<LibraryRecord>::name("stdio.h")).unwrap_err();
        assert!(matches!(err, StorageError::NotFound { kind: EntityKind::Library, .. }));
    }
}
