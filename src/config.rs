use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ErrorContext, PredataError, Result};

pub const CONFIG_FILE: &str = "predata.toml";
pub const SAMPLE_CONFIG_FILE: &str = "predata.toml.example";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredataConfig {
    /// Path to the catalog snapshot (JSON)
    pub catalog: Option<PathBuf>,

    /// File to write DDL to; stdout when unset
    pub output: Option<PathBuf>,

    /// Path to output dependency graph in Graphviz DOT format
    pub output_graph: Option<PathBuf>,

    /// Check the object sequence against its references before rendering
    pub validate_order: Option<bool>,

    /// Emit CREATE SCHEMA statements
    pub include_schemas: Option<bool>,
}

impl PredataConfig {
    /// Load configuration from predata.toml in the current directory
    pub fn load_from_file() -> Result<Option<Self>> {
        Self::load_from_path(CONFIG_FILE)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let config_path = path.as_ref();

        if !config_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(config_path).read_context(config_path)?;
        let config: PredataConfig = toml::from_str(&content).map_err(|e| PredataError::ConfigLoad {
            path: config_path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(Some(config))
    }

    /// Merge CLI arguments with config file values
    /// CLI arguments take precedence over config file values
    pub fn merge_with_cli(
        config_file: Option<Self>,
        cli_catalog: Option<PathBuf>,
        cli_output: Option<PathBuf>,
        cli_output_graph: Option<PathBuf>,
        cli_no_validate: bool,
    ) -> Self {
        let base_config = config_file.unwrap_or_default();

        Self {
            catalog: cli_catalog.or(base_config.catalog),
            output: cli_output.or(base_config.output),
            output_graph: cli_output_graph.or(base_config.output_graph),
            validate_order: if cli_no_validate {
                Some(false)
            } else {
                base_config.validate_order
            },
            include_schemas: base_config.include_schemas,
        }
    }

    pub fn validate_order(&self) -> bool {
        self.validate_order.unwrap_or(true)
    }

    pub fn include_schemas(&self) -> bool {
        self.include_schemas.unwrap_or(true)
    }

    /// The snapshot path, or a configuration error naming how to supply one.
    pub fn catalog_path(&self) -> Result<&Path> {
        self.catalog.as_deref().ok_or_else(|| {
            PredataError::Configuration(format!(
                "no catalog snapshot given; pass --catalog or set catalog in {}",
                CONFIG_FILE
            ))
        })
    }

    /// Create a sample configuration file in `dir`
    pub fn write_sample_config(dir: impl AsRef<Path>) -> Result<PathBuf> {
        let sample_config = PredataConfig {
            catalog: Some(PathBuf::from("catalog.json")),
            output: Some(PathBuf::from("predata.sql")),
            output_graph: None,
            validate_order: Some(true),
            include_schemas: Some(true),
        };

        let content = toml::to_string_pretty(&sample_config)
            .map_err(|e| PredataError::Configuration(e.to_string()))?;
        let path = dir.as_ref().join(SAMPLE_CONFIG_FILE);
        fs::write(&path, content).write_context(&path)?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_serialization() {
        let config = PredataConfig {
            catalog: Some(PathBuf::from("catalog.json")),
            output: Some(PathBuf::from("out.sql")),
            output_graph: Some(PathBuf::from("graph.dot")),
            validate_order: Some(false),
            include_schemas: None,
        };

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: PredataConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config, parsed);
    }

    #[test]
    fn test_config_merge_cli_precedence() {
        let config_file = PredataConfig {
            catalog: Some(PathBuf::from("config_catalog.json")),
            output: Some(PathBuf::from("config.sql")),
            output_graph: Some(PathBuf::from("config_graph.dot")),
            validate_order: Some(true),
            include_schemas: Some(false),
        };

        let merged = PredataConfig::merge_with_cli(
            Some(config_file),
            Some(PathBuf::from("cli_catalog.json")),
            None,
            None,
            true,
        );

        assert_eq!(merged.catalog, Some(PathBuf::from("cli_catalog.json")));
        assert_eq!(merged.output, Some(PathBuf::from("config.sql")));
        assert_eq!(merged.output_graph, Some(PathBuf::from("config_graph.dot")));
        assert!(!merged.validate_order());
        assert!(!merged.include_schemas());
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = PredataConfig::default();
        assert!(config.validate_order());
        assert!(config.include_schemas());
        assert!(matches!(config.catalog_path(), Err(PredataError::Configuration(_))));
    }

    #[test]
    fn test_config_load_nonexistent_file() {
        let temp_dir = tempdir().unwrap();
        let result = PredataConfig::load_from_path(temp_dir.path().join(CONFIG_FILE)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_config_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE);

        let config_content = r#"
catalog = "snapshots/catalog.json"
validate_order = false
"#;
        fs::write(&config_path, config_content).unwrap();

        let loaded_config = PredataConfig::load_from_path(&config_path).unwrap().unwrap();

        assert_eq!(loaded_config.catalog, Some(PathBuf::from("snapshots/catalog.json")));
        assert_eq!(loaded_config.output, None);
        assert!(!loaded_config.validate_order());
        assert!(loaded_config.include_schemas());
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE);
        fs::write(&config_path, "validate_order = \"sometimes\"").unwrap();

        let err = PredataConfig::load_from_path(&config_path).unwrap_err();
        assert!(matches!(err, PredataError::ConfigLoad { .. }));
    }

    #[test]
    fn test_write_sample_config() {
        let temp_dir = tempdir().unwrap();

        let sample_path = PredataConfig::write_sample_config(temp_dir.path()).unwrap();
        assert!(sample_path.ends_with(SAMPLE_CONFIG_FILE));

        let content = fs::read_to_string(&sample_path).unwrap();
        assert!(content.contains("catalog"));
        assert!(content.contains("validate_order = true"));
    }
}
