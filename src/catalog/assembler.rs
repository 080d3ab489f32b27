//! Joins the per-OID table fact maps into one [`Table`] per relation.

use tracing::{debug, info};

use super::identifier::Relation;
use super::table::{
    AlteredPartitionRelation, ColumnDefinition, ExternalTableDefinition, ForeignTableDefinition,
    PartitionLevelInfo, ReplicaIdentity, Table, TableDefinition,
};
use super::FactMap;

/// Independently collected table facts, each keyed by relation OID.
#[derive(Debug, Clone, Default)]
pub struct TableFacts {
    pub columns: FactMap<Vec<ColumnDefinition>>,
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
}

impl TableFacts {
    fn definition_for(&self, relation: &Relation) -> TableDefinition {
        let oid = relation.oid;

        let mut column_defs = self.columns.lookup_or_default(oid);
        column_defs.sort_by_key(|column| column.num);

        TableDefinition {
            dist_policy: self.distribution_policies.lookup_or_default(oid),
            part_def: self.partition_defs.lookup_or_default(oid),
            part_template_def: self.partition_templates.lookup_or_default(oid),
            storage_opts: self.storage_options.lookup_or_default(oid),
            tablespace: self.tablespaces.lookup_or_default(oid),
            column_defs,
            ext_table_def: self.external_defs.lookup(oid).cloned(),
            partition_level_info: self.partition_levels.lookup_or_default(oid),
            table_type: self.table_types.lookup_or_default(oid),
            is_unlogged: self.unlogged.lookup_or_default(oid),
            foreign_def: self.foreign_defs.lookup(oid).cloned(),
            // a missing entry and an empty list render the same way
            inherits: self.inheritance.lookup_or_default(oid),
            replica_identity: self.replica_identities.lookup(oid).copied(),
            partition_altered_schemas: self.altered_schemas.lookup_or_default(oid),
        }
    }
}

/// Build one [`Table`] per relation, in relation order.
///
/// Facts missing for a relation leave the matching field at its zero value.
pub fn construct_definitions_for_tables(facts: &TableFacts, relations: &[Relation]) -> Vec<Table> {
    info!("Gathering additional table metadata");
    debug!(relations = relations.len(), "Constructing table definition map");

    relations
        .iter()
        .map(|relation| Table::new(relation.clone(), facts.definition_for(relation)))
        .collect()
}

/// Definitions keyed by relation OID, the shape the dependent renderer looks
/// tables up in.
pub fn table_definition_map(tables: &[Table]) -> FactMap<TableDefinition> {
    tables
        .iter()
        .map(|table| (table.relation.oid, table.def.clone()))
        .collect()
}
