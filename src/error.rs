use std::path::PathBuf;
use thiserror::Error;

use crate::catalog::Oid;

/// Main error type for predata
#[derive(Error, Debug)]
pub enum PredataError {
    // Parse errors, recoverable at the call site
    #[error("{input} is not a valid identifier")]
    InvalidIdentifier { input: String },

    #[error("Invalid ACL entry {input:?}: {message}")]
    InvalidAcl { input: String, message: String },

    // Structural errors, abort the render
    #[error("No table definition for {name} (oid {oid})")]
    MissingReferencedObject { oid: Oid, name: String },

    #[error("Unsupported {kind} variant for {name}")]
    UnsupportedVariant { kind: String, name: String },

    #[error("{object} is ordered before {dependency}, which it depends on")]
    DependencyOrder { object: String, dependency: String },

    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    #[error("Failed to write to output sink")]
    Sink(#[from] std::fmt::Error),

    // Snapshot and file errors
    #[error("Failed to load catalog snapshot {path}: {message}")]
    SnapshotLoad { path: PathBuf, message: String },

    #[error("Failed to read {path}: {message}")]
    FileRead {
        path: PathBuf,
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {message}")]
    FileWrite {
        path: PathBuf,
        message: String,
        #[source]
        source: std::io::Error,
    },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to load configuration from {path}: {message}")]
    ConfigLoad { path: PathBuf, message: String },
}

impl PredataError {
    /// Parse-time errors can be reported and skipped; everything else means
    /// the emitted DDL stream would be incomplete.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PredataError::InvalidIdentifier { .. } | PredataError::InvalidAcl { .. }
        )
    }
}

/// Result type alias for predata operations
pub type Result<T> = std::result::Result<T, PredataError>;

/// Helper trait for attaching a file path to I/O failures
pub trait ErrorContext<T> {
    fn read_context(self, path: impl Into<PathBuf>) -> Result<T>;

    fn write_context(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorContext<T> for std::result::Result<T, std::io::Error> {
    fn read_context(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| PredataError::FileRead {
            path: path.into(),
            message: source.to_string(),
            source,
        })
    }

    fn write_context(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| PredataError::FileWrite {
            path: path.into(),
            message: source.to_string(),
            source,
        })
    }
}

/// Helper function to format error with all its causes
pub fn format_error_chain(err: &PredataError) -> String {
    use std::error::Error;

    let mut output = format!("Error: {}", err);

    let mut current_err: &dyn Error = err;
    while let Some(source) = current_err.source() {
        output.push_str(&format!("\n  Caused by: {}", source));
        current_err = source;
    }

    output
}

/// Helper function to suggest fixes for common errors
pub fn suggest_fix(err: &PredataError) -> Option<String> {
    match err {
        PredataError::MissingReferencedObject { name, .. } => Some(format!(
            "Table {} is in the object sequence but has no collected definition.\n\
             - Ensure the relation list passed to the assembler matches the object sequence",
            name
        )),
        PredataError::DependencyOrder { object, dependency } => Some(format!(
            "{} must be emitted after {}.\n\
             - Re-run the dependency sort over the full object set\n\
             - Or disable validation with validate_order = false",
            object, dependency
        )),
        PredataError::CircularDependency(details) => Some(format!(
            "Circular dependency detected: {}\n\
             - The object sequence cannot be emitted in a single pass",
            details
        )),
        PredataError::InvalidAcl { input, .. } => Some(format!(
            "ACL entries look like grantee=privileges/grantor, got {:?}\n\
             - Quoted grantees must close their double quote",
            input
        )),
        PredataError::SnapshotLoad { path, .. } => Some(format!(
            "Could not read catalog snapshot {}\n\
             - Check the path and that the file is valid JSON",
            path.display()
        )),
        _ => None,
    }
}
