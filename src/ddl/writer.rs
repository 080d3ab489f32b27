use std::fmt;

use crate::error::Result;

/// Every block starts on a fresh line after one blank line.
pub const BLOCK_OPENER: &str = "\n\n";

/// How a block is closed, which decides the gap before the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spacing {
    /// Closed with a newline: two blank lines before the next block.
    Double,
    /// Closed without a newline: one blank line before the next block.
    Single,
}

impl Spacing {
    fn closer(self) -> &'static str {
        match self {
            Spacing::Double => "\n",
            Spacing::Single => "",
        }
    }
}

/// Append-only statement sink.
pub struct SqlWriter<W> {
    sink: W,
    blocks: usize,
}

impl<W: fmt::Write> SqlWriter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink, blocks: 0 }
    }

    /// Write one block of statements. Empty text writes nothing.
    pub fn block(&mut self, spacing: Spacing, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.sink.write_str(BLOCK_OPENER)?;
        self.sink.write_str(text)?;
        self.sink.write_str(spacing.closer())?;
        self.blocks += 1;
        Ok(())
    }

    pub fn blocks_written(&self) -> usize {
        self.blocks
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl Default for SqlWriter<String> {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl SqlWriter<String> {
    pub fn as_str(&self) -> &str {
        &self.sink
    }
}
