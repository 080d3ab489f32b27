//! Synthesis of pre-data DDL from collected catalog facts.
//!
//! Facts are gathered once (see [`catalog::CatalogSnapshot`]), assembled into
//! table definitions and then written as a stream of SQL blocks by the
//! renderers in [`ddl`].

pub mod analysis;
pub mod catalog;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ddl;
pub mod error;
pub mod logging;
pub mod output;

use std::collections::HashSet;
use std::fmt;

use tracing::{info, warn};

pub use analysis::{validate_dependency_order, DependencyGraph};
pub use catalog::{CatalogFacts, CatalogSnapshot, Oid, Schema, Sortable};
pub use config::PredataConfig;
pub use ddl::{Spacing, SqlWriter};
pub use error::{PredataError, Result};

use catalog::{
    altered_partition_schemas, construct_definitions_for_tables, get_unique_schemas,
    table_definition_map, Table,
};
use ddl::{print_constraint_statements, print_create_schema_statements, print_dependent_objects};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Check the object sequence against its references before writing.
    pub validate_order: bool,
    /// Emit CREATE SCHEMA for every schema owning a rendered relation.
    pub include_schemas: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            validate_order: true,
            include_schemas: true,
        }
    }
}

impl From<&PredataConfig> for RenderOptions {
    fn from(config: &PredataConfig) -> Self {
        Self {
            validate_order: config.validate_order(),
            include_schemas: config.include_schemas(),
        }
    }
}

/// Counts of what a render pass wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub schemas: usize,
    pub functions: usize,
    pub types: usize,
    pub tables: usize,
    pub constraints: usize,
    pub blocks: usize,
}

/// Run the full pre-data pipeline over `facts`, appending to `writer`.
///
/// Order validation, when enabled, runs before the first block is written.
pub fn render_predata<W: fmt::Write>(
    facts: &CatalogFacts,
    writer: &mut SqlWriter<W>,
    options: &RenderOptions,
) -> Result<RenderSummary> {
    let tables = construct_definitions_for_tables(&facts.table_facts, &facts.relations);
    let table_defs = table_definition_map(&tables);

    if options.validate_order {
        validate_dependency_order(&facts.objects, &table_defs)?;
    }

    info!("Writing pre-data statements");
    let blocks_before = writer.blocks_written();

    let schemas = if options.include_schemas {
        schemas_to_create(facts, &tables)
    } else {
        Vec::new()
    };
    print_create_schema_statements(writer, &schemas, &facts.metadata)?;
    print_dependent_objects(
        writer,
        &facts.objects,
        &facts.metadata,
        &table_defs,
        &facts.constraints,
    )?;
    print_constraint_statements(writer, &facts.constraints, &facts.metadata)?;

    warn_unrendered_metadata(facts, &schemas);

    let mut summary = RenderSummary {
        schemas: schemas.iter().filter(|s| s.name != ddl::schema::PUBLIC_SCHEMA).count(),
        constraints: facts.constraints.iter().filter(|c| !c.is_domain_constraint).count(),
        blocks: writer.blocks_written() - blocks_before,
        ..Default::default()
    };
    for object in &facts.objects {
        match object {
            Sortable::Function(_) => summary.functions += 1,
            Sortable::Type(_) => summary.types += 1,
            Sortable::Table(_) => summary.tables += 1,
        }
    }
    info!(
        schemas = summary.schemas,
        functions = summary.functions,
        types = summary.types,
        tables = summary.tables,
        constraints = summary.constraints,
        "Finished writing pre-data statements"
    );
    Ok(summary)
}

/// Build the dependency graph of `facts` without validating it.
pub fn dependency_graph(facts: &CatalogFacts) -> DependencyGraph {
    let tables = construct_definitions_for_tables(&facts.table_facts, &facts.relations);
    DependencyGraph::build_from_sortables(&facts.objects, &table_definition_map(&tables))
}

/// Schemas owning a relation plus the targets of relocated partitions,
/// ordered by name.
pub fn schemas_to_create(facts: &CatalogFacts, tables: &[Table]) -> Vec<Schema> {
    let mut schemas = get_unique_schemas(&facts.schemas, &facts.relations);
    for name in altered_partition_schemas(tables) {
        if schemas.iter().any(|schema| schema.name == name) {
            continue;
        }
        let schema = facts
            .schemas
            .iter()
            .find(|schema| schema.name == name)
            .cloned()
            .unwrap_or_else(|| Schema::new(0, name));
        schemas.push(schema);
    }
    schemas.sort_by(|a, b| a.name.cmp(&b.name));
    schemas
}

fn warn_unrendered_metadata(facts: &CatalogFacts, schemas: &[Schema]) {
    let rendered: HashSet<Oid> = schemas
        .iter()
        .map(|schema| schema.oid)
        .chain(facts.objects.iter().map(Sortable::oid))
        .chain(
            facts
                .constraints
                .iter()
                .filter(|constraint| !constraint.is_domain_constraint)
                .map(|constraint| constraint.oid),
        )
        .collect();

    let unrendered = facts.metadata.oids().filter(|oid| !rendered.contains(oid)).count();
    if unrendered > 0 {
        warn!(count = unrendered, "Metadata collected for objects that were not rendered");
    }
}
