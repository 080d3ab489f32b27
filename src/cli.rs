use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Clone)]
#[command(name = "predata")]
#[command(about = "Pre-data DDL generator for catalog snapshots")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Increase verbosity level (can be used multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Generate a sample configuration file
    Init,

    /// Render pre-data DDL for a catalog snapshot
    Render {
        /// Catalog snapshot (JSON)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Write DDL to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output dependency graph in Graphviz DOT format to the specified file
        #[arg(long)]
        output_graph: Option<PathBuf>,

        /// Skip the dependency order check
        #[arg(long)]
        no_validate: bool,
    },

    /// List the schemas that own at least one relation
    Schemas {
        /// Catalog snapshot (JSON)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Parse a single ACL entry and show the privileges it grants
    ParseAcl {
        /// ACL entry, e.g. testrole=arwdDxt/gpadmin
        #[arg(value_name = "ACL")]
        acl: String,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
