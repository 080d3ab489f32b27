//! Statement rendering. Every renderer appends complete blocks to a
//! [`SqlWriter`] and never reads back what it wrote.

pub mod constraints;
pub mod dependent;
pub mod metadata;
pub mod schema;
pub mod table;
pub mod writer;

pub use constraints::print_constraint_statements;
pub use dependent::print_dependent_objects;
pub use metadata::{print_object_metadata, print_object_metadata_with, quote_literal};
pub use schema::print_create_schema_statements;
pub use table::{print_create_table_statement, print_post_create_table_statements};
pub use writer::{Spacing, SqlWriter, BLOCK_OPENER};
