use std::fmt;

use tracing::debug;

use super::metadata::print_constraint_comment;
use super::writer::{Spacing, SqlWriter};
use crate::catalog::{Constraint, MetadataMap};
use crate::error::Result;

/// Emit `ALTER TABLE ... ADD CONSTRAINT` for every table constraint.
///
/// Foreign keys follow all other constraints so the keys they reference
/// already exist. Domain constraints are skipped; they are part of
/// `CREATE DOMAIN`.
pub fn print_constraint_statements<W: fmt::Write>(
    writer: &mut SqlWriter<W>,
    constraints: &[Constraint],
    metadata: &MetadataMap,
) -> Result<()> {
    let (foreign_keys, others): (Vec<&Constraint>, Vec<&Constraint>) = constraints
        .iter()
        .filter(|constraint| !constraint.is_domain_constraint)
        .partition(|constraint| constraint.is_foreign_key());

    for constraint in others.into_iter().chain(foreign_keys) {
        debug!(constraint = %constraint.name, owner = %constraint.owning_object, "Writing constraint");
        writer.block(Spacing::Double, &add_constraint_statement(constraint))?;
        if let Some(constraint_metadata) = metadata.lookup(constraint.oid) {
            print_constraint_comment(
                writer,
                constraint_metadata,
                &constraint.name,
                &constraint.owning_object,
            )?;
        }
    }
    Ok(())
}

fn add_constraint_statement(constraint: &Constraint) -> String {
    // constraints on a partition root must reach every partition
    let only = if constraint.is_partition_parent { "" } else { "ONLY " };
    format!(
        "ALTER TABLE {}{} ADD CONSTRAINT {} {};",
        only, constraint.owning_object, constraint.name, constraint.con_def
    )
}
