//! Value records describing collected catalog facts.
//!
//! Everything in here is built once from a catalog source and then only read
//! while statements are rendered.

pub mod acl;
pub mod assembler;
pub mod identifier;
pub mod objects;
pub mod snapshot;
pub mod table;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use acl::{parse_acl, privileges_for, Acl, MetadataMap, ObjectMetadata, Privilege, PrivilegeFlags};
pub use assembler::{construct_definitions_for_tables, table_definition_map, TableFacts};
pub use identifier::{get_unique_schemas, quote_ident, Relation, Schema};
pub use objects::{
    BaseType, CompositeAttribute, Constraint, ConstraintType, DomainType, Function, ObjectType,
    Sortable, Type, TypeKind,
};
pub use snapshot::CatalogSnapshot;
pub use table::{
    altered_partition_schemas, AlteredPartitionRelation, ColumnDefinition,
    ExternalTableDefinition, ForeignTableDefinition, PartitionLevel, PartitionLevelInfo,
    ReplicaIdentity, StorageType, Table, TableDefinition,
};

/// Object identifier used as the join key between fact maps.
pub type Oid = u32;

/// Read-only OID keyed store for one kind of catalog fact.
///
/// Lookups are the only access path used while rendering, so iteration order
/// of the underlying map never leaks into the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactMap<T>(HashMap<Oid, T>);

impl<T> FactMap<T> {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn lookup(&self, oid: Oid) -> Option<&T> {
        self.0.get(&oid)
    }

    pub fn contains(&self, oid: Oid) -> bool {
        self.0.contains_key(&oid)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn oids(&self) -> impl Iterator<Item = Oid> + '_ {
        self.0.keys().copied()
    }
}

impl<T: Clone + Default> FactMap<T> {
    /// Missing keys yield the fact's zero value.
    pub fn lookup_or_default(&self, oid: Oid) -> T {
        self.0.get(&oid).cloned().unwrap_or_default()
    }
}

impl<T> Default for FactMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<(Oid, T)> for FactMap<T> {
    fn from_iter<I: IntoIterator<Item = (Oid, T)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T> From<HashMap<Oid, T>> for FactMap<T> {
    fn from(map: HashMap<Oid, T>) -> Self {
        Self(map)
    }
}

/// Everything one rendering pass consumes, finalized before rendering starts.
#[derive(Debug, Clone, Default)]
pub struct CatalogFacts {
    pub schemas: Vec<Schema>,
    pub relations: Vec<Relation>,
    pub table_facts: TableFacts,
    pub metadata: MetadataMap,
    pub constraints: Vec<Constraint>,
    /// Already placed in dependency order by the resolver.
    pub objects: Vec<Sortable>,
}
