use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::acl::Acl;
use super::identifier::Relation;
use super::objects::ObjectType;
use super::Oid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartitionLevel {
    #[serde(rename = "p")]
    Parent,
    #[serde(rename = "i")]
    Intermediate,
    #[serde(rename = "l")]
    Leaf,
}

/// Where a table sits in a partition hierarchy. Unpartitioned tables carry
/// no level.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionLevelInfo {
    pub oid: Oid,
    pub level: Option<PartitionLevel>,
    pub root_name: String,
}

impl PartitionLevelInfo {
    pub fn is_parent(&self) -> bool {
        self.level == Some(PartitionLevel::Parent)
    }
}

/// Column storage class, stored in the catalog as a one-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageType {
    #[serde(rename = "e")]
    External,
    #[serde(rename = "m")]
    Main,
    #[serde(rename = "p")]
    Plain,
    #[serde(rename = "x")]
    Extended,
}

impl StorageType {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "e" => Some(StorageType::External),
            "m" => Some(StorageType::Main),
            "p" => Some(StorageType::Plain),
            "x" => Some(StorageType::Extended),
            _ => None,
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageType::External => write!(f, "EXTERNAL"),
            StorageType::Main => write!(f, "MAIN"),
            StorageType::Plain => write!(f, "PLAIN"),
            StorageType::Extended => write!(f, "EXTENDED"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplicaIdentity {
    #[serde(rename = "d")]
    Default,
    #[serde(rename = "i")]
    Index,
    #[serde(rename = "f")]
    Full,
    #[serde(rename = "n")]
    Nothing,
}

impl ReplicaIdentity {
    /// Only FULL and NOTHING need restating; the others are restored with
    /// the table or its index.
    pub fn clause(&self) -> Option<&'static str> {
        match self {
            ReplicaIdentity::Full => Some("FULL"),
            ReplicaIdentity::Nothing => Some("NOTHING"),
            ReplicaIdentity::Default | ReplicaIdentity::Index => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnDefinition {
    /// OID of the owning relation.
    pub oid: Oid,
    pub num: i32,
    /// Already quoted.
    pub name: String,
    pub type_name: String,
    pub not_null: bool,
    pub has_default: bool,
    pub default_val: String,
    pub encoding: String,
    pub stat_target: Option<i32>,
    /// Set only when it differs from the type's default storage.
    pub storage_type: Option<StorageType>,
    pub options: String,
    pub fdw_options: String,
    pub collation: String,
    pub comment: String,
    pub privileges: Vec<Acl>,
    pub security_label_provider: String,
    pub security_label: String,
}

impl ColumnDefinition {
    pub fn new(oid: Oid, num: i32, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            oid,
            num,
            name: name.into(),
            type_name: type_name.into(),
            ..Default::default()
        }
    }

    pub fn has_security_label(&self) -> bool {
        !self.security_label_provider.is_empty() && !self.security_label.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalTableDefinition {
    pub oid: Oid,
    pub writable: bool,
    pub web: bool,
    pub locations: Vec<String>,
    /// Segment placement for LOCATION/EXECUTE, e.g. `ALL` or `MASTER`.
    pub exec_location: String,
    pub command: String,
    /// Format keyword, e.g. `text` or `csv`.
    pub format_type: String,
    pub format_opts: String,
    pub encoding: String,
    pub log_errors: bool,
    pub reject_limit: Option<i32>,
    pub reject_limit_percent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForeignTableDefinition {
    pub oid: Oid,
    pub options: String,
    pub server: String,
}

/// A child partition living in a different schema than its root.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlteredPartitionRelation {
    pub old_schema: String,
    pub new_schema: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableDefinition {
    pub dist_policy: String,
    pub part_def: String,
    pub part_template_def: String,
    pub storage_opts: String,
    pub tablespace: String,
    pub column_defs: Vec<ColumnDefinition>,
    pub ext_table_def: Option<ExternalTableDefinition>,
    pub partition_level_info: PartitionLevelInfo,
    /// Composite type of a typed table (`CREATE TABLE ... OF type`).
    pub table_type: String,
    pub is_unlogged: bool,
    pub foreign_def: Option<ForeignTableDefinition>,
    pub inherits: Vec<String>,
    pub replica_identity: Option<ReplicaIdentity>,
    pub partition_altered_schemas: Vec<AlteredPartitionRelation>,
}

impl TableDefinition {
    pub fn is_external(&self) -> bool {
        self.ext_table_def.is_some()
    }

    pub fn is_foreign(&self) -> bool {
        self.foreign_def.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    pub relation: Relation,
    pub def: TableDefinition,
}

impl Table {
    pub fn new(relation: Relation, def: TableDefinition) -> Self {
        Self { relation, def }
    }

    /// External and foreign tables hold no rows of their own.
    pub fn skip_data_backup(&self) -> bool {
        self.def.is_external() || self.def.is_foreign()
    }

    pub fn object_type(&self) -> ObjectType {
        if self.def.is_foreign() {
            ObjectType::ForeignTable
        } else {
            ObjectType::Table
        }
    }

    pub fn fqn(&self) -> String {
        self.relation.fqn()
    }
}

/// Schemas that relocated child partitions are moved into, in name order.
pub fn altered_partition_schemas(tables: &[Table]) -> BTreeSet<String> {
    tables
        .iter()
        .flat_map(|table| table.def.partition_altered_schemas.iter())
        .map(|altered| altered.new_schema.clone())
        .collect()
}
