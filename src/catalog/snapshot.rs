//! File-based catalog source.
//!
//! A snapshot is the JSON rendition of everything the catalog queries would
//! return: raw codes and ACL strings are kept as the catalog spells them and
//! only converted by [`CatalogSnapshot::into_facts`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::acl::{parse_acl, Acl, MetadataMap, ObjectMetadata};
use super::assembler::TableFacts;
use super::identifier::{make_fqn, Relation, Schema};
use super::objects::{
    BaseType, CompositeAttribute, Constraint, DomainType, Function, Sortable, Type, TypeKind,
};
use super::table::{
    AlteredPartitionRelation, ColumnDefinition, ExternalTableDefinition, ForeignTableDefinition,
    PartitionLevelInfo, ReplicaIdentity, StorageType,
};
use super::{CatalogFacts, FactMap, Oid};
use crate::error::{ErrorContext, PredataError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawMetadata {
    pub owner: String,
    pub comment: String,
    /// `aclitem` strings, one per grantee.
    pub privileges: Vec<String>,
    pub security_label_provider: String,
    pub security_label: String,
}

impl RawMetadata {
    fn parse(self) -> Result<ObjectMetadata> {
        Ok(ObjectMetadata {
            owner: self.owner,
            comment: self.comment,
            privileges: parse_acl_list(&self.privileges)?,
            security_label_provider: self.security_label_provider,
            security_label: self.security_label,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawColumn {
    pub num: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub not_null: bool,
    pub has_default: bool,
    pub default_val: String,
    pub encoding: String,
    pub stat_target: Option<i32>,
    /// Storage code, empty when the column keeps its type's default.
    pub storage_type: String,
    pub options: String,
    pub fdw_options: String,
    pub collation: String,
    pub comment: String,
    pub privileges: Vec<String>,
    pub security_label_provider: String,
    pub security_label: String,
}

impl RawColumn {
    fn into_column(self, oid: Oid) -> Result<ColumnDefinition> {
        let storage_type = match self.storage_type.as_str() {
            "" => None,
            code => {
                let storage = StorageType::from_code(code);
                if storage.is_none() {
                    warn!(column = %self.name, code, "Ignoring unknown storage code");
                }
                storage
            }
        };

        Ok(ColumnDefinition {
            oid,
            num: self.num,
            name: self.name,
            type_name: self.type_name,
            not_null: self.not_null,
            has_default: self.has_default,
            default_val: self.default_val,
            encoding: self.encoding,
            stat_target: self.stat_target,
            storage_type,
            options: self.options,
            fdw_options: self.fdw_options,
            collation: self.collation,
            comment: self.comment,
            privileges: parse_acl_list(&self.privileges)?,
            security_label_provider: self.security_label_provider,
            security_label: self.security_label,
        })
    }
}

/// A type as the catalog reports it, with its kind still a `typtype` code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawType {
    pub oid: Oid,
    pub schema: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind_code: String,
    pub input: String,
    pub output: String,
    pub receive: String,
    pub send: String,
    pub internal_length: Option<i32>,
    pub alignment: String,
    pub storage: String,
    pub default_val: String,
    pub element: String,
    pub delimiter: String,
    pub attributes: Vec<CompositeAttribute>,
    pub base_type: String,
    pub collation: String,
    pub not_null: bool,
}

impl RawType {
    fn into_type(self) -> Result<Type> {
        let kind = match self.kind_code.as_str() {
            "b" => TypeKind::Base(BaseType {
                input: self.input,
                output: self.output,
                receive: self.receive,
                send: self.send,
                internal_length: self.internal_length,
                alignment: self.alignment,
                storage: self.storage,
                default_val: self.default_val,
                element: self.element,
                delimiter: self.delimiter,
            }),
            "c" => TypeKind::Composite {
                attributes: self.attributes,
            },
            "d" => TypeKind::Domain(DomainType {
                base_type: self.base_type,
                default_val: self.default_val,
                collation: self.collation,
                not_null: self.not_null,
            }),
            other => {
                return Err(PredataError::UnsupportedVariant {
                    kind: format!("type kind '{}'", other),
                    name: make_fqn(&self.schema, &self.name),
                })
            }
        };

        Ok(Type {
            oid: self.oid,
            schema: self.schema,
            name: self.name,
            kind,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawObject {
    Function(Function),
    Type(RawType),
    Table(Relation),
}

impl RawObject {
    fn into_sortable(self) -> Result<Sortable> {
        Ok(match self {
            RawObject::Function(function) => Sortable::Function(function),
            RawObject::Type(raw) => Sortable::Type(raw.into_type()?),
            RawObject::Table(relation) => Sortable::Table(relation),
        })
    }
}

/// Everything the catalog source supplies for one render.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSnapshot {
    pub schemas: Vec<Schema>,
    pub relations: Vec<Relation>,
    pub columns: HashMap<Oid, Vec<RawColumn>>,
    pub distribution_policies: FactMap<String>,
    pub partition_defs: FactMap<String>,
    pub partition_templates: FactMap<String>,
    pub tablespaces: FactMap<String>,
    pub storage_options: FactMap<String>,
    pub external_defs: FactMap<ExternalTableDefinition>,
    pub partition_levels: FactMap<PartitionLevelInfo>,
    pub table_types: FactMap<String>,
    pub unlogged: FactMap<bool>,
    pub foreign_defs: FactMap<ForeignTableDefinition>,
    pub inheritance: FactMap<Vec<String>>,
    pub replica_identities: FactMap<ReplicaIdentity>,
    pub altered_schemas: FactMap<Vec<AlteredPartitionRelation>>,
    pub metadata: HashMap<Oid, RawMetadata>,
    pub constraints: Vec<Constraint>,
    /// Already in dependency order.
    pub objects: Vec<RawObject>,
}

impl CatalogSnapshot {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).read_context(path)?;
        Self::parse(&content, path.to_path_buf())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::parse(json, PathBuf::from("<inline>"))
    }

    fn parse(json: &str, path: PathBuf) -> Result<Self> {
        let snapshot: CatalogSnapshot =
            serde_json::from_str(json).map_err(|e| PredataError::SnapshotLoad {
                path,
                message: e.to_string(),
            })?;
        debug!(
            schemas = snapshot.schemas.len(),
            relations = snapshot.relations.len(),
            objects = snapshot.objects.len(),
            "Loaded catalog snapshot"
        );
        Ok(snapshot)
    }

    /// Parse ACL strings and kind codes into the records rendering consumes.
    pub fn into_facts(self) -> Result<CatalogFacts> {
        let mut columns = HashMap::with_capacity(self.columns.len());
        for (oid, raw_columns) in self.columns {
            let parsed = raw_columns
                .into_iter()
                .map(|raw| raw.into_column(oid))
                .collect::<Result<Vec<_>>>()?;
            columns.insert(oid, parsed);
        }

        let mut metadata = HashMap::with_capacity(self.metadata.len());
        for (oid, raw) in self.metadata {
            metadata.insert(oid, raw.parse()?);
        }

        let objects = self
            .objects
            .into_iter()
            .map(RawObject::into_sortable)
            .collect::<Result<Vec<_>>>()?;

        let table_facts = TableFacts {
            columns: columns.into(),
            distribution_policies: self.distribution_policies,
            partition_defs: self.partition_defs,
            partition_templates: self.partition_templates,
            tablespaces: self.tablespaces,
            storage_options: self.storage_options,
            external_defs: self.external_defs,
            partition_levels: self.partition_levels,
            table_types: self.table_types,
            unlogged: self.unlogged,
            foreign_defs: self.foreign_defs,
            inheritance: self.inheritance,
            replica_identities: self.replica_identities,
            altered_schemas: self.altered_schemas,
        };

        Ok(CatalogFacts {
            schemas: self.schemas,
            relations: self.relations,
            table_facts,
            metadata: MetadataMap::from(metadata),
            constraints: self.constraints,
            objects,
        })
    }
}

fn parse_acl_list(raw: &[String]) -> Result<Vec<Acl>> {
    let mut privileges = Vec::with_capacity(raw.len());
    for item in raw {
        if let Some(acl) = parse_acl(item)? {
            privileges.push(acl);
        }
    }
    Ok(privileges)
}
