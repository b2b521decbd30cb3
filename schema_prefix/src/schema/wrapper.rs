//! Prefix-translating wrapper around a schema snapshot
//!
//! Several installations can share one physical database by giving each a
//! table-name prefix. Migration code should never have to know about that
//! prefix: it addresses tables by their logical name (`"users"`) while the
//! wrapper talks to the snapshot and the connection in physical names
//! (`"oc_users"`).
//!
//! Dropping a table is a two-phase affair. `drop_table` removes the table
//! from the in-memory snapshot right away and queues the name; nothing hits
//! the live database until `perform_drop_table_calls` runs the queue.

use indexmap::IndexSet;

use crate::db::connection::SchemaConnection;
use crate::error::{Error, Result};
use crate::schema::types::{DatabaseSchema, SchemaOps, Table, View};

/// Wraps a schema snapshot behind a table-name prefix
pub struct SchemaWrapper<C: SchemaConnection> {
    connection: C,
    schema: DatabaseSchema,
    table_prefix: String,
    /// Logical names of tables dropped from the snapshot but not yet from
    /// the live database, in the order the drops were requested.
    tables_to_delete: IndexSet<String>,
}

impl<C: SchemaConnection> SchemaWrapper<C> {
    /// Create a wrapper by taking a fresh schema snapshot from the connection
    pub async fn new(connection: C) -> Result<Self> {
        let schema = connection.create_schema().await?;
        let table_prefix = connection.get_table_prefix().to_string();

        Ok(Self {
            connection,
            schema,
            table_prefix,
            tables_to_delete: IndexSet::new(),
        })
    }

    /// The schema snapshot this wrapper operates on
    pub fn get_wrapped_schema(&self) -> &DatabaseSchema {
        &self.schema
    }

    /// The connection this wrapper was built from
    pub fn get_connection(&self) -> &C {
        &self.connection
    }

    /// The configured table-name prefix
    pub fn get_table_prefix(&self) -> &str {
        &self.table_prefix
    }

    fn prefixed(&self, table_name: &str) -> String {
        format!("{}{}", self.table_prefix, table_name)
    }

    /// Strip one leading prefix. Tables that do not carry the prefix belong
    /// to another installation (or predate prefixing) and pass through as-is.
    fn unprefixed<'a>(&self, table_name: &'a str) -> &'a str {
        table_name
            .strip_prefix(self.table_prefix.as_str())
            .unwrap_or(table_name)
    }

    /// All table names in snapshot order, with the prefix stripped
    pub fn get_table_names_without_prefix(&self) -> Vec<String> {
        self.schema
            .get_table_names()
            .iter()
            .map(|name| self.unprefixed(name).to_string())
            .collect()
    }

    /// Look up a table by its logical name
    pub fn get_table(&self, table_name: &str) -> Result<&Table> {
        self.schema.get_table(&self.prefixed(table_name))
    }

    /// Look up a table by its logical name, for adding columns or indexes
    pub fn get_table_mut(&mut self, table_name: &str) -> Result<&mut Table> {
        self.schema.get_table_mut(&self.prefixed(table_name))
    }

    /// Does the snapshot have a table with the given logical name?
    pub fn has_table(&self, table_name: &str) -> bool {
        self.schema.has_table(&self.prefixed(table_name))
    }

    /// Create a new table under the prefixed form of the given logical name
    pub fn create_table(&mut self, table_name: &str) -> Result<&mut Table> {
        self.schema.create_table(&self.prefixed(table_name))
    }

    /// Renaming is rejected outright: a rename cannot be reconciled with
    /// queued drops or with prefix translation without risking an
    /// inconsistent snapshot.
    pub fn rename_table(&mut self, _old_table_name: &str, _new_table_name: &str) -> Result<()> {
        Err(Error::UnsupportedOperation(
            "renaming tables is not supported, create the new table and drop the old one instead"
                .to_string(),
        ))
    }

    /// Drop a table from the snapshot and queue it for physical deletion.
    ///
    /// After this call the table is invisible to `has_table`/`get_table`
    /// even though it still exists in the live database; the physical drop
    /// happens in [`perform_drop_table_calls`](Self::perform_drop_table_calls).
    pub fn drop_table(&mut self, table_name: &str) -> Result<()> {
        tracing::debug!(table = table_name, "Queueing table for deletion");
        self.tables_to_delete.insert(table_name.to_string());
        self.schema.drop_table(&self.prefixed(table_name))
    }

    /// Logical names of tables queued for deletion but not yet dropped
    /// from the live database
    pub fn get_pending_drops(&self) -> Vec<&str> {
        self.tables_to_delete.iter().map(String::as_str).collect()
    }

    /// Run every queued physical drop through the connection, in the order
    /// the drops were requested.
    ///
    /// Each entry leaves the queue only once the connection reports success
    /// for it. On failure the error propagates immediately: entries already
    /// processed stay removed, the failing entry and everything after it
    /// remain queued, so a later call retries exactly the unapplied drops.
    pub async fn perform_drop_table_calls(&mut self) -> Result<()> {
        while let Some(table_name) = self.tables_to_delete.first().cloned() {
            self.connection.drop_table(&table_name).await?;
            self.tables_to_delete.shift_remove(&table_name);
            tracing::info!(table = table_name.as_str(), "Dropped table");
        }

        Ok(())
    }
}

/// Everything the wrapper does not redefine is handed to the wrapped schema
/// unchanged, arguments and result alike.
impl<C: SchemaConnection> SchemaOps for SchemaWrapper<C> {
    fn get_view_names(&self) -> Vec<String> {
        self.schema.get_view_names()
    }

    fn get_view(&self, view_name: &str) -> Result<&View> {
        self.schema.get_view(view_name)
    }

    fn has_view(&self, view_name: &str) -> bool {
        self.schema.has_view(view_name)
    }

    fn create_view(&mut self, view_name: &str, definition: &str) -> Result<&mut View> {
        self.schema.create_view(view_name, definition)
    }

    fn drop_view(&mut self, view_name: &str) -> Result<()> {
        self.schema.drop_view(view_name)
    }

    fn get_schema_name(&self) -> Option<&str> {
        self.schema.get_schema_name()
    }

    fn is_empty(&self) -> bool {
        self.schema.is_empty()
    }
}
