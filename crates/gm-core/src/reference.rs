//! Entity references: address a row by id, by unique name, or by a record
//! that is already in hand.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entity::Entity;

/// A reference to an entity of kind `E`.
///
/// Resolved once by the repository into a concrete record before any
/// business logic looks at it.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityRef<E: Entity> {
    Id(E::Id),
    Name(String),
    Instance(E),
}

impl<E: Entity> EntityRef<E> {
    pub fn id(id: impl Into<E::Id>) -> Self {
        EntityRef::Id(id.into())
    }

    pub fn name(name: impl Into<String>) -> Self {
        EntityRef::Name(name.into())
    }

    pub fn instance(entity: E) -> Self {
        EntityRef::Instance(entity)
    }

    /// The identifying value used in error messages.
    pub fn key(&self) -> String {
        match self {
            EntityRef::Id(id) => id.to_string(),
            EntityRef::Name(name) => name.clone(),
            EntityRef::Instance(entity) => entity.id().to_string(),
        }
    }
}

impl<E: Entity> fmt::Display for EntityRef<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", E::KIND, self.key())
    }
}

impl<E: Entity> From<&str> for EntityRef<E> {
    fn from(name: &str) -> Self {
        EntityRef::Name(name.to_string())
    }
}

impl<E: Entity> From<String> for EntityRef<E> {
    fn from(name: String) -> Self {
        EntityRef::Name(name)
    }
}

impl<E: Entity> From<RefKey> for EntityRef<E> {
    fn from(key: RefKey) -> Self {
        match key {
            RefKey::Id(raw) => EntityRef::Id(raw.into()),
            RefKey::Name(name) => EntityRef::Name(name),
        }
    }
}

/// The wire form of a reference: a JSON number is an id, a string a name.
///
/// Path segments use [`FromStr`]: anything that parses as an integer is an id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefKey {
    Id(i64),
    Name(String),
}

impl RefKey {
    pub fn into_ref<E: Entity>(self) -> EntityRef<E> {
        self.into()
    }
}

impl FromStr for RefKey {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<i64>() {
            Ok(raw) => RefKey::Id(raw),
            Err(_) => RefKey::Name(s.to_string()),
        })
    }
}

impl fmt::Display for RefKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefKey::Id(raw) => write!(f, "{}", raw),
            RefKey::Name(name) => f.write_str(name),
        }
    }
}
