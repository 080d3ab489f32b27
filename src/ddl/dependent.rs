//! Functions, types and tables written in the order the dependency resolver
//! placed them.

use std::fmt;

use tracing::debug;

use super::metadata::print_object_metadata_with;
use super::table::print_create_table_statement;
use super::writer::{Spacing, SqlWriter};
use crate::catalog::{
    BaseType, CompositeAttribute, Constraint, DomainType, FactMap, Function, MetadataMap,
    ObjectMetadata, ObjectType, Sortable, Table, TableDefinition, Type, TypeKind,
};
use crate::error::{PredataError, Result};

/// Write every object in `objects`, in sequence order, each followed by its
/// metadata.
///
/// All tables are resolved against `table_defs` before anything is written,
/// so a missing definition fails without leaving partial output behind.
pub fn print_dependent_objects<W: fmt::Write>(
    writer: &mut SqlWriter<W>,
    objects: &[Sortable],
    metadata: &MetadataMap,
    table_defs: &FactMap<TableDefinition>,
    constraints: &[Constraint],
) -> Result<()> {
    let tables = resolve_tables(objects, table_defs)?;
    let empty = ObjectMetadata::default();

    for (object, table) in objects.iter().zip(tables) {
        let object_metadata = metadata.lookup(object.oid()).unwrap_or(&empty);
        debug!(object = %object.fqn(), kind = %object.object_type(), "Writing object");

        match object {
            Sortable::Function(function) => print_function(writer, function, object_metadata)?,
            Sortable::Type(type_) => print_type(writer, type_, object_metadata, constraints)?,
            Sortable::Table(_) => {
                if let Some(table) = table {
                    print_create_table_statement(writer, &table, object_metadata)?;
                }
            }
        }
    }
    Ok(())
}

fn resolve_tables(
    objects: &[Sortable],
    table_defs: &FactMap<TableDefinition>,
) -> Result<Vec<Option<Table>>> {
    objects
        .iter()
        .map(|object| match object {
            Sortable::Table(relation) => table_defs
                .lookup(relation.oid)
                .map(|def| Some(Table::new(relation.clone(), def.clone())))
                .ok_or_else(|| PredataError::MissingReferencedObject {
                    oid: relation.oid,
                    name: relation.fqn(),
                }),
            Sortable::Function(_) | Sortable::Type(_) => Ok(None),
        })
        .collect()
}

fn print_function<W: fmt::Write>(
    writer: &mut SqlWriter<W>,
    function: &Function,
    metadata: &ObjectMetadata,
) -> Result<()> {
    writer.block(Spacing::Double, &function_statement(function))?;
    print_object_metadata_with(
        writer,
        metadata,
        &function.signature(),
        ObjectType::Function,
        Spacing::Double,
    )
}

pub fn function_statement(function: &Function) -> String {
    format!(
        "CREATE FUNCTION {}({}) RETURNS {} AS\n$_${}$_$\nLANGUAGE {}\nCOST 0;",
        function.fqn(),
        function.arguments,
        function.result_type,
        function.body,
        function.language
    )
}

fn print_type<W: fmt::Write>(
    writer: &mut SqlWriter<W>,
    type_: &Type,
    metadata: &ObjectMetadata,
    constraints: &[Constraint],
) -> Result<()> {
    let fqn = type_.fqn();
    let (statement, spacing) = match &type_.kind {
        TypeKind::Base(base) => (base_type_statement(&fqn, base), Spacing::Double),
        // composite types and their metadata are separated by one blank line
        TypeKind::Composite { attributes } => {
            (composite_type_statement(&fqn, attributes), Spacing::Single)
        }
        TypeKind::Domain(domain) => (domain_statement(&fqn, domain, constraints), Spacing::Double),
    };

    writer.block(spacing, &statement)?;
    print_object_metadata_with(writer, metadata, &fqn, type_.object_type(), spacing)
}

fn base_type_statement(fqn: &str, base: &BaseType) -> String {
    let mut options = vec![
        format!("INPUT = {}", base.input),
        format!("OUTPUT = {}", base.output),
    ];
    if !base.receive.is_empty() {
        options.push(format!("RECEIVE = {}", base.receive));
    }
    if !base.send.is_empty() {
        options.push(format!("SEND = {}", base.send));
    }
    if let Some(length) = base.internal_length {
        if length < 0 {
            options.push("INTERNALLENGTH = VARIABLE".to_string());
        } else {
            options.push(format!("INTERNALLENGTH = {}", length));
        }
    }
    if !base.alignment.is_empty() {
        options.push(format!("ALIGNMENT = {}", base.alignment));
    }
    if !base.storage.is_empty() {
        options.push(format!("STORAGE = {}", base.storage));
    }
    if !base.default_val.is_empty() {
        options.push(format!("DEFAULT = {}", base.default_val));
    }
    if !base.element.is_empty() {
        options.push(format!("ELEMENT = {}", base.element));
    }
    if !base.delimiter.is_empty() {
        options.push(format!("DELIMITER = '{}'", base.delimiter));
    }

    format!("CREATE TYPE {} (\n\t{}\n);", fqn, options.join(",\n\t"))
}

fn composite_type_statement(fqn: &str, attributes: &[CompositeAttribute]) -> String {
    let attributes: Vec<String> = attributes
        .iter()
        .map(|attribute| format!("\t{} {}", attribute.name, attribute.type_name))
        .collect();
    format!("CREATE TYPE {} AS (\n{}\n);", fqn, attributes.join(",\n"))
}

/// Domain check constraints are matched to their domain by owning object.
fn domain_statement(fqn: &str, domain: &DomainType, constraints: &[Constraint]) -> String {
    let mut statement = format!("CREATE DOMAIN {} AS {}", fqn, domain.base_type);
    if !domain.default_val.is_empty() {
        statement.push_str(&format!(" DEFAULT {}", domain.default_val));
    }
    if !domain.collation.is_empty() {
        statement.push_str(&format!(" COLLATE {}", domain.collation));
    }
    if domain.not_null {
        statement.push_str(" NOT NULL");
    }
    for constraint in constraints.iter().filter(|c| c.owning_object == fqn) {
        statement.push_str(&format!("\n\tCONSTRAINT {} {}", constraint.name, constraint.con_def));
    }
    statement.push(';');
    statement
}
