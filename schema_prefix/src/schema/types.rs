//! Type definitions for the in-memory schema model
//!
//! `DatabaseSchema` is the mutable snapshot a migration run works against.
//! Tables and views are kept in `IndexMap`s so enumeration order is stable
//! and matches the order in which the snapshot was built.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Represents a complete database schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSchema {
    pub tables: IndexMap<String, Table>,
    pub views: IndexMap<String, View>,
    pub schema_name: Option<String>,
}

impl DatabaseSchema {
    /// Create a new empty database schema
    pub fn new(schema_name: Option<String>) -> Self {
        Self {
            tables: IndexMap::new(),
            views: IndexMap::new(),
            schema_name,
        }
    }

    /// Add a table to the schema, replacing any table with the same name
    pub fn add_table(&mut self, table: Table) {
        self.tables.insert(table.name.clone(), table);
    }

    /// Add a view to the schema, replacing any view with the same name
    pub fn add_view(&mut self, view: View) {
        self.views.insert(view.name.clone(), view);
    }

    /// All table names, in the order the tables entered the schema
    pub fn get_table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    /// Look up a table by name
    pub fn get_table(&self, table_name: &str) -> Result<&Table> {
        self.tables
            .get(table_name)
            .ok_or_else(|| Error::TableNotFound(table_name.to_string()))
    }

    /// Look up a table by name for modification
    pub fn get_table_mut(&mut self, table_name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(table_name)
            .ok_or_else(|| Error::TableNotFound(table_name.to_string()))
    }

    /// Does this schema have a table with the given name?
    pub fn has_table(&self, table_name: &str) -> bool {
        self.tables.contains_key(table_name)
    }

    /// Create a new empty table and return it for column population
    pub fn create_table(&mut self, table_name: &str) -> Result<&mut Table> {
        if self.tables.contains_key(table_name) {
            return Err(Error::TableAlreadyExists(table_name.to_string()));
        }

        Ok(self
            .tables
            .entry(table_name.to_string())
            .or_insert_with(|| Table::new(table_name)))
    }

    /// Remove a table from the schema, keeping the order of the remaining tables
    pub fn drop_table(&mut self, table_name: &str) -> Result<()> {
        self.tables
            .shift_remove(table_name)
            .map(|_| ())
            .ok_or_else(|| Error::TableNotFound(table_name.to_string()))
    }

    /// All view names, in the order the views entered the schema
    pub fn get_view_names(&self) -> Vec<String> {
        self.views.keys().cloned().collect()
    }

    /// Look up a view by name
    pub fn get_view(&self, view_name: &str) -> Result<&View> {
        self.views
            .get(view_name)
            .ok_or_else(|| Error::ViewNotFound(view_name.to_string()))
    }

    /// Does this schema have a view with the given name?
    pub fn has_view(&self, view_name: &str) -> bool {
        self.views.contains_key(view_name)
    }

    /// Create a new view from its defining query
    pub fn create_view(&mut self, view_name: &str, definition: &str) -> Result<&mut View> {
        if self.views.contains_key(view_name) {
            return Err(Error::ViewAlreadyExists(view_name.to_string()));
        }

        Ok(self
            .views
            .entry(view_name.to_string())
            .or_insert_with(|| View::new(view_name, definition)))
    }

    /// Remove a view from the schema
    pub fn drop_view(&mut self, view_name: &str) -> Result<()> {
        self.views
            .shift_remove(view_name)
            .map(|_| ())
            .ok_or_else(|| Error::ViewNotFound(view_name.to_string()))
    }

    /// The database schema (namespace) this snapshot was taken from, if any
    pub fn get_schema_name(&self) -> Option<&str> {
        self.schema_name.as_deref()
    }

    /// True when the schema holds no tables and no views
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.views.is_empty()
    }
}

/// Schema operations that exist independently of table-name prefixing.
///
/// `DatabaseSchema` implements this directly. `SchemaWrapper` implements it
/// by delegating each method, unchanged, to the schema it wraps, so calling
/// one of these on the wrapper gives exactly the result the wrapped schema
/// would give. Table accessors are deliberately not part of this trait: the
/// wrapper redefines those with prefix translation.
pub trait SchemaOps {
    fn get_view_names(&self) -> Vec<String>;
    fn get_view(&self, view_name: &str) -> Result<&View>;
    fn has_view(&self, view_name: &str) -> bool;
    fn create_view(&mut self, view_name: &str, definition: &str) -> Result<&mut View>;
    fn drop_view(&mut self, view_name: &str) -> Result<()>;
    fn get_schema_name(&self) -> Option<&str>;
    fn is_empty(&self) -> bool;
}

impl SchemaOps for DatabaseSchema {
    fn get_view_names(&self) -> Vec<String> {
        DatabaseSchema::get_view_names(self)
    }

    fn get_view(&self, view_name: &str) -> Result<&View> {
        DatabaseSchema::get_view(self, view_name)
    }

    fn has_view(&self, view_name: &str) -> bool {
        DatabaseSchema::has_view(self, view_name)
    }

    fn create_view(&mut self, view_name: &str, definition: &str) -> Result<&mut View> {
        DatabaseSchema::create_view(self, view_name, definition)
    }

    fn drop_view(&mut self, view_name: &str) -> Result<()> {
        DatabaseSchema::drop_view(self, view_name)
    }

    fn get_schema_name(&self) -> Option<&str> {
        DatabaseSchema::get_schema_name(self)
    }

    fn is_empty(&self) -> bool {
        DatabaseSchema::is_empty(self)
    }
}

/// Represents a database table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub primary_key: Option<PrimaryKey>,
    pub indexes: Vec<Index>,
    pub foreign_keys: Vec<ForeignKey>,
    pub comment: Option<String>,
}

impl Table {
    /// Create a new table with the given name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            primary_key: None,
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            comment: None,
        }
    }

    /// Add a column to the table
    pub fn add_column(&mut self, column: Column) -> &mut Self {
        self.columns.push(column);
        self
    }

    /// Look up a column by name
    pub fn get_column(&self, column_name: &str) -> Option<&Column> {
        self.columns.iter().find(|col| col.name == column_name)
    }

    /// Does this table have a column with the given name?
    pub fn has_column(&self, column_name: &str) -> bool {
        self.columns.iter().any(|col| col.name == column_name)
    }

    /// Remove a column from the table
    pub fn drop_column(&mut self, column_name: &str) -> &mut Self {
        self.columns.retain(|col| col.name != column_name);
        self
    }

    /// Set the primary key for the table
    pub fn set_primary_key(&mut self, pk: PrimaryKey) -> &mut Self {
        self.primary_key = Some(pk);
        self
    }

    /// Add an index to the table
    pub fn add_index(&mut self, index: Index) -> &mut Self {
        self.indexes.push(index);
        self
    }

    /// Add a foreign key to the table
    pub fn add_foreign_key(&mut self, fk: ForeignKey) -> &mut Self {
        self.foreign_keys.push(fk);
        self
    }
}

/// Represents a database column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub default: Option<String>,
    pub comment: Option<String>,
    pub is_unique: bool,
}

impl Column {
    /// Create a new column with the given name and type
    pub fn new(name: &str, data_type: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: data_type.to_string(),
            nullable: false,
            default: None,
            comment: None,
            is_unique: false,
        }
    }

    /// Set whether the column is nullable
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Set a default value for the column
    pub fn default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }
}

/// Represents a primary key constraint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimaryKey {
    pub name: Option<String>,
    pub columns: Vec<String>,
}

/// Represents an index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
    pub is_unique: bool,
}

/// Represents a foreign key constraint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignKey {
    pub name: String,
    pub columns: Vec<String>,
    pub ref_table: String,
    pub ref_columns: Vec<String>,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
}

/// Represents a database view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct View {
    pub name: String,
    pub definition: String,
    pub is_materialized: bool,
}

impl View {
    /// Create a new view with the given name and defining query
    pub fn new(name: &str, definition: &str) -> Self {
        Self {
            name: name.to_string(),
            definition: definition.to_string(),
            is_materialized: false,
        }
    }
}
