//! schema_prefix: a prefix-aware schema wrapper for shared databases
//!
//! Several logical installations can live in one physical database by
//! prefixing every table name with an installation-specific string. This
//! crate wraps an in-memory schema snapshot so migration code works purely
//! in logical (unprefixed) table names: the wrapper translates to and from
//! physical names, and defers destructive drops until an explicit flush.
//!
//! ```no_run
//! # async fn run() -> schema_prefix::Result<()> {
//! let mut schema = schema_prefix::init("schema_prefix.toml").await?;
//!
//! if !schema.has_table("users") {
//!     schema.create_table("users")?;
//! }
//! schema.drop_table("sessions_old")?;
//!
//! // The old table is gone from the snapshot, but still in the database
//! // until the queued drops are flushed.
//! schema.perform_drop_table_calls().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod schema;
pub mod utils;

#[cfg(test)]
mod test;

// Re-export main types for easier access
pub use config::Config;
pub use db::connection::{DatabaseConnection, SchemaConnection};
pub use error::{Error, Result};
pub use schema::analyzer::SchemaAnalyzer;
pub use schema::types::{Column, DatabaseSchema, SchemaOps, Table};
pub use schema::wrapper::SchemaWrapper;

/// Initialize a schema wrapper from the specified configuration file
pub async fn init(config_path: &str) -> Result<SchemaWrapper<DatabaseConnection>> {
    let config = config::load_from_file(config_path)?;
    utils::logging::init_logging(&config.logging)?;

    let connection = DatabaseConnection::connect(&config.database).await?;
    SchemaWrapper::new(connection).await
}
