use std::fs;
use std::time::Instant;

use color_eyre::eyre::{eyre, Result};
use predata::catalog::{get_unique_schemas, parse_acl};
use predata::cli::{Cli, Commands};
use predata::error::ErrorContext;
use predata::logging::{self, format_duration, output};
use predata::output::{report_acl, report_schemas, report_summary, CliOutputHandler};
use predata::{dependency_graph, render_predata, CatalogFacts, CatalogSnapshot, PredataConfig, RenderOptions, SqlWriter};
use tracing::info;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    logging::init(cli.verbose).map_err(|e| eyre!("failed to initialize logging: {}", e))?;

    let config_file = PredataConfig::load_from_file()?;

    match cli.command {
        Commands::Init => {
            let path = PredataConfig::write_sample_config(".")?;
            output::success(format!("Wrote sample configuration to {}", path.display()));
        }
        Commands::Render {
            catalog,
            output,
            output_graph,
            no_validate,
        } => {
            let config = PredataConfig::merge_with_cli(config_file, catalog, output, output_graph, no_validate);
            render(&config)?;
        }
        Commands::Schemas { catalog } => {
            let config = PredataConfig::merge_with_cli(config_file, catalog, None, None, false);
            let facts = load_facts(&config)?;
            report_schemas(&CliOutputHandler, &get_unique_schemas(&facts.schemas, &facts.relations));
        }
        Commands::ParseAcl { acl } => match parse_acl(&acl) {
            Ok(parsed) => report_acl(&CliOutputHandler, parsed.as_ref()),
            Err(e) => {
                predata::log_error!(e);
                return Err(e.into());
            }
        },
    }

    Ok(())
}

fn load_facts(config: &PredataConfig) -> Result<CatalogFacts> {
    let catalog = config.catalog_path()?;
    output::step(format!("Loading catalog snapshot {}", catalog.display()));
    Ok(CatalogSnapshot::load(catalog)?.into_facts()?)
}

fn render(config: &PredataConfig) -> Result<()> {
    let started = Instant::now();
    let facts = load_facts(config)?;

    if let Some(graph_path) = &config.output_graph {
        let graph = dependency_graph(&facts);
        fs::write(graph_path, graph.to_graphviz()).write_context(graph_path)?;
        info!(path = %graph_path.display(), nodes = graph.node_count(), "Wrote dependency graph");
    }

    let mut writer = SqlWriter::default();
    let summary = match render_predata(&facts, &mut writer, &RenderOptions::from(config)) {
        Ok(summary) => summary,
        Err(e) => {
            predata::log_error!(e);
            return Err(e.into());
        }
    };

    let ddl = writer.into_inner();
    match &config.output {
        Some(path) => fs::write(path, &ddl).write_context(path)?,
        None => print!("{}", ddl),
    }

    report_summary(&CliOutputHandler, &summary);
    output::success(format!("Done in {}", format_duration(started.elapsed())));
    Ok(())
}
