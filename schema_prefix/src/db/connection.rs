//! Database connection handling
//!
//! This module defines the capability a [`SchemaWrapper`] consumes from its
//! connection, plus the sqlx-backed implementation used against a live
//! database.
//!
//! [`SchemaWrapper`]: crate::schema::wrapper::SchemaWrapper

use async_trait::async_trait;
use sqlx::{
    mysql::MySqlPoolOptions, postgres::PgPoolOptions, sqlite::SqlitePoolOptions, MySql, Pool,
    Postgres, Sqlite,
};

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use crate::schema::analyzer::SchemaAnalyzer;
use crate::schema::types::DatabaseSchema;

/// Connection capability consumed by the schema wrapper.
///
/// `drop_table` takes the logical (unprefixed) table name; applying the
/// configured prefix before touching the database is the implementation's
/// job, so the wrapper never prefixes twice.
#[async_trait]
pub trait SchemaConnection: Send + Sync {
    /// The configured table-name prefix, stable for the connection's lifetime
    fn get_table_prefix(&self) -> &str;

    /// Take a fresh mutable snapshot of the current database schema
    async fn create_schema(&self) -> Result<DatabaseSchema>;

    /// Physically drop the table behind the given logical name
    async fn drop_table(&self, table_name: &str) -> Result<()>;
}

/// Enumeration of supported database backends
#[derive(Debug, Clone)]
pub enum DatabasePool {
    Postgres(Pool<Postgres>),
    MySql(Pool<MySql>),
    Sqlite(Pool<Sqlite>),
}

/// A live database connection with its installation's table prefix
#[derive(Debug, Clone)]
pub struct DatabaseConnection {
    pool: DatabasePool,
    table_prefix: String,
    schema: Option<String>,
}

impl DatabaseConnection {
    /// Create a new database connection from configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool_size = config.pool_size.unwrap_or(10);
        let timeout_seconds = config.timeout_seconds.unwrap_or(30);

        let pool = match config.driver.as_str() {
            "postgres" => {
                let pool = PgPoolOptions::new()
                    .max_connections(pool_size)
                    .acquire_timeout(std::time::Duration::from_secs(timeout_seconds))
                    .connect(&config.url)
                    .await?;

                DatabasePool::Postgres(pool)
            }
            "mysql" => {
                let pool = MySqlPoolOptions::new()
                    .max_connections(pool_size)
                    .acquire_timeout(std::time::Duration::from_secs(timeout_seconds))
                    .connect(&config.url)
                    .await?;

                DatabasePool::MySql(pool)
            }
            "sqlite" => {
                let pool = SqlitePoolOptions::new()
                    .max_connections(pool_size)
                    .acquire_timeout(std::time::Duration::from_secs(timeout_seconds))
                    .connect(&config.url)
                    .await?;

                DatabasePool::Sqlite(pool)
            }
            _ => {
                return Err(Error::DatabaseError(format!(
                    "Unsupported database driver: {}",
                    config.driver
                )))
            }
        };

        Ok(Self {
            pool,
            table_prefix: config.table_prefix.clone(),
            schema: config.schema.clone(),
        })
    }

    /// The backend pool behind this connection
    pub fn get_pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Get the schema (namespace) name from the configuration, if set
    pub fn get_schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Execute a SQL statement
    pub async fn execute(&self, sql: &str) -> Result<()> {
        match &self.pool {
            DatabasePool::Postgres(pool) => {
                sqlx::query(sql).execute(pool).await?;
            }
            DatabasePool::MySql(pool) => {
                sqlx::query(sql).execute(pool).await?;
            }
            DatabasePool::Sqlite(pool) => {
                sqlx::query(sql).execute(pool).await?;
            }
        }

        Ok(())
    }

    /// Quote an identifier for the connected backend
    fn quote_identifier(&self, identifier: &str) -> String {
        match &self.pool {
            DatabasePool::MySql(_) => format!("`{}`", identifier),
            DatabasePool::Postgres(_) | DatabasePool::Sqlite(_) => {
                format!("\"{}\"", identifier)
            }
        }
    }
}

#[async_trait]
impl SchemaConnection for DatabaseConnection {
    fn get_table_prefix(&self) -> &str {
        &self.table_prefix
    }

    async fn create_schema(&self) -> Result<DatabaseSchema> {
        SchemaAnalyzer::new(self.clone()).analyze().await
    }

    async fn drop_table(&self, table_name: &str) -> Result<()> {
        let physical_name = format!("{}{}", self.table_prefix, table_name);
        let sql = format!("DROP TABLE {}", self.quote_identifier(&physical_name));

        tracing::debug!(table = physical_name.as_str(), "Dropping table");
        self.execute(&sql).await
    }
}
