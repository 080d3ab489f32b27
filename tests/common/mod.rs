#![allow(dead_code)]

pub mod fixtures;

use predata::SqlWriter;

pub use fixtures::*;

/// Run `render` against a fresh in-memory writer and return what it wrote.
pub fn render_to_string<F>(render: F) -> String
where
    F: FnOnce(&mut SqlWriter<String>) -> predata::Result<()>,
{
    let mut writer = SqlWriter::default();
    render(&mut writer).expect("rendering succeeds");
    writer.into_inner()
}
