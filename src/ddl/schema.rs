use std::fmt;

use tracing::debug;

use super::metadata::print_object_metadata;
use super::writer::{Spacing, SqlWriter};
use crate::catalog::{MetadataMap, ObjectType, Schema};
use crate::error::Result;

/// Schema that exists in every database and is never created.
pub const PUBLIC_SCHEMA: &str = "public";

/// Emit `CREATE SCHEMA` and the schema's metadata for each schema, in order.
pub fn print_create_schema_statements<W: fmt::Write>(
    writer: &mut SqlWriter<W>,
    schemas: &[Schema],
    metadata: &MetadataMap,
) -> Result<()> {
    for schema in schemas {
        let name = schema.to_string();
        if schema.name != PUBLIC_SCHEMA {
            debug!(schema = %name, "Writing schema");
            writer.block(Spacing::Single, &format!("CREATE SCHEMA {};", name))?;
        }
        if let Some(schema_metadata) = metadata.lookup(schema.oid) {
            print_object_metadata(writer, schema_metadata, &name, ObjectType::Schema)?;
        }
    }
    Ok(())
}
