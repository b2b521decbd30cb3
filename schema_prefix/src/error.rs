//! Error types for schema_prefix

use thiserror::Error;

/// Result type for schema_prefix operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for schema_prefix
#[derive(Error, Debug)]
pub enum Error {
    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Table already exists: {0}")]
    TableAlreadyExists(String),

    #[error("View not found: {0}")]
    ViewNotFound(String),

    #[error("View already exists: {0}")]
    ViewAlreadyExists(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Schema analysis error: {0}")]
    SchemaAnalysisError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),
}

/// Convert TOML deserialization errors to schema_prefix errors
impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::ConfigError(error.to_string())
    }
}
