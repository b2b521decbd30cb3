//! Database schema snapshot introspection
//!
//! This module builds the in-memory [`DatabaseSchema`] snapshot a wrapper
//! starts from, by reading the live database's catalog. Tables come back
//! with their columns and primary key; index and foreign-key details are
//! left to the diffing stage that consumes the snapshot.

use async_trait::async_trait;
use indexmap::IndexMap;
use sqlx::{FromRow, MySql, Pool, Postgres, Sqlite};

use crate::db::connection::{DatabaseConnection, DatabasePool};
use crate::error::Result;
use crate::schema::types::{Column, DatabaseSchema, PrimaryKey, Table, View};

/// Schema analyzer trait, implemented once per backend
#[async_trait]
pub trait Analyzer {
    /// Analyze the database schema
    async fn analyze_schema(&self, schema_name: Option<&str>) -> Result<DatabaseSchema>;

    /// Analyze table definitions
    async fn analyze_tables(&self, schema_name: Option<&str>) -> Result<IndexMap<String, Table>>;

    /// Analyze view definitions
    async fn analyze_views(&self, schema_name: Option<&str>) -> Result<IndexMap<String, View>>;
}

/// Schema analyzer for database schema introspection
pub struct SchemaAnalyzer {
    connection: DatabaseConnection,
}

impl SchemaAnalyzer {
    /// Create a new schema analyzer
    pub fn new(connection: DatabaseConnection) -> Self {
        Self { connection }
    }

    /// Snapshot the current database schema
    pub async fn analyze(&self) -> Result<DatabaseSchema> {
        match self.connection.get_pool() {
            DatabasePool::Postgres(pool) => {
                PostgresAnalyzer { pool }
                    .analyze_schema(self.connection.get_schema())
                    .await
            }
            DatabasePool::MySql(pool) => {
                MySqlAnalyzer { pool }
                    .analyze_schema(self.connection.get_schema())
                    .await
            }
            DatabasePool::Sqlite(pool) => {
                SqliteAnalyzer { pool }
                    .analyze_schema(self.connection.get_schema())
                    .await
            }
        }
    }
}

// Row types shared by the information_schema based backends

#[derive(FromRow)]
struct TableRow {
    table_name: String,
}

#[derive(FromRow)]
struct ColumnRow {
    column_name: String,
    data_type: String,
    is_nullable: String,
    column_default: Option<String>,
    character_maximum_length: Option<i64>,
}

#[derive(FromRow)]
struct PrimaryKeyRow {
    constraint_name: String,
    column_name: String,
}

#[derive(FromRow)]
struct ViewRow {
    table_name: String,
    view_definition: Option<String>,
}

fn column_from_row(row: ColumnRow) -> Column {
    let mut data_type = row.data_type;
    if let Some(max_length) = row.character_maximum_length {
        if data_type == "character varying" || data_type == "varchar" {
            data_type = format!("varchar({})", max_length);
        }
    }

    Column {
        name: row.column_name,
        data_type,
        nullable: row.is_nullable.eq_ignore_ascii_case("YES"),
        default: row.column_default,
        comment: None,
        is_unique: false,
    }
}

/// PostgreSQL schema analyzer
struct PostgresAnalyzer<'a> {
    pool: &'a Pool<Postgres>,
}

#[async_trait]
impl<'a> Analyzer for PostgresAnalyzer<'a> {
    async fn analyze_schema(&self, schema_name: Option<&str>) -> Result<DatabaseSchema> {
        let schema = schema_name.unwrap_or("public");
        let mut db_schema = DatabaseSchema::new(Some(schema.to_string()));

        db_schema.tables = self.analyze_tables(Some(schema)).await?;
        db_schema.views = self.analyze_views(Some(schema)).await?;

        Ok(db_schema)
    }

    async fn analyze_tables(&self, schema_name: Option<&str>) -> Result<IndexMap<String, Table>> {
        let schema = schema_name.unwrap_or("public");
        let mut tables = IndexMap::new();

        let sql = r#"
            SELECT table_name
            FROM information_schema.tables
            WHERE table_schema = $1 AND table_type = 'BASE TABLE'
            ORDER BY table_name
        "#;

        let table_rows = sqlx::query_as::<_, TableRow>(sql)
            .bind(schema)
            .fetch_all(self.pool)
            .await?;

        for row in table_rows {
            let table_name = row.table_name;
            let mut table = Table::new(&table_name);

            let sql = r#"
                SELECT
                    column_name,
                    data_type,
                    is_nullable,
                    column_default,
                    character_maximum_length::int8 AS character_maximum_length
                FROM information_schema.columns
                WHERE table_schema = $1 AND table_name = $2
                ORDER BY ordinal_position
            "#;

            let column_rows = sqlx::query_as::<_, ColumnRow>(sql)
                .bind(schema)
                .bind(&table_name)
                .fetch_all(self.pool)
                .await?;

            for col in column_rows {
                table.add_column(column_from_row(col));
            }

            let sql = r#"
                SELECT
                    tc.constraint_name,
                    kcu.column_name
                FROM
                    information_schema.table_constraints tc
                JOIN information_schema.key_column_usage kcu
                    ON tc.constraint_name = kcu.constraint_name
                    AND tc.table_schema = kcu.table_schema
                WHERE
                    tc.constraint_type = 'PRIMARY KEY'
                    AND tc.table_schema = $1
                    AND tc.table_name = $2
                ORDER BY kcu.ordinal_position
            "#;

            let pk_rows = sqlx::query_as::<_, PrimaryKeyRow>(sql)
                .bind(schema)
                .bind(&table_name)
                .fetch_all(self.pool)
                .await?;

            if !pk_rows.is_empty() {
                table.set_primary_key(PrimaryKey {
                    name: Some(pk_rows[0].constraint_name.clone()),
                    columns: pk_rows.iter().map(|r| r.column_name.clone()).collect(),
                });
            }

            tables.insert(table_name, table);
        }

        Ok(tables)
    }

    async fn analyze_views(&self, schema_name: Option<&str>) -> Result<IndexMap<String, View>> {
        let schema = schema_name.unwrap_or("public");
        let mut views = IndexMap::new();

        let sql = r#"
            SELECT table_name, view_definition
            FROM information_schema.views
            WHERE table_schema = $1
            ORDER BY table_name
        "#;

        let view_rows = sqlx::query_as::<_, ViewRow>(sql)
            .bind(schema)
            .fetch_all(self.pool)
            .await?;

        for row in view_rows {
            let view = View::new(&row.table_name, row.view_definition.as_deref().unwrap_or(""));
            views.insert(row.table_name, view);
        }

        Ok(views)
    }
}

/// MySQL schema analyzer
struct MySqlAnalyzer<'a> {
    pool: &'a Pool<MySql>,
}

#[async_trait]
impl<'a> Analyzer for MySqlAnalyzer<'a> {
    async fn analyze_schema(&self, schema_name: Option<&str>) -> Result<DatabaseSchema> {
        let mut db_schema = DatabaseSchema::new(schema_name.map(|s| s.to_string()));

        db_schema.tables = self.analyze_tables(schema_name).await?;
        db_schema.views = self.analyze_views(schema_name).await?;

        Ok(db_schema)
    }

    async fn analyze_tables(&self, schema_name: Option<&str>) -> Result<IndexMap<String, Table>> {
        let mut tables = IndexMap::new();

        let sql = r#"
            SELECT table_name AS table_name
            FROM information_schema.tables
            WHERE table_schema = COALESCE(?, DATABASE()) AND table_type = 'BASE TABLE'
            ORDER BY table_name
        "#;

        let table_rows = sqlx::query_as::<_, TableRow>(sql)
            .bind(schema_name)
            .fetch_all(self.pool)
            .await?;

        for row in table_rows {
            let table_name = row.table_name;
            let mut table = Table::new(&table_name);

            let sql = r#"
                SELECT
                    column_name AS column_name,
                    data_type AS data_type,
                    is_nullable AS is_nullable,
                    column_default AS column_default,
                    CAST(character_maximum_length AS SIGNED) AS character_maximum_length
                FROM information_schema.columns
                WHERE table_schema = COALESCE(?, DATABASE()) AND table_name = ?
                ORDER BY ordinal_position
            "#;

            let column_rows = sqlx::query_as::<_, ColumnRow>(sql)
                .bind(schema_name)
                .bind(&table_name)
                .fetch_all(self.pool)
                .await?;

            for col in column_rows {
                table.add_column(column_from_row(col));
            }

            let sql = r#"
                SELECT
                    constraint_name AS constraint_name,
                    column_name AS column_name
                FROM information_schema.key_column_usage
                WHERE table_schema = COALESCE(?, DATABASE())
                    AND table_name = ?
                    AND constraint_name = 'PRIMARY'
                ORDER BY ordinal_position
            "#;

            let pk_rows = sqlx::query_as::<_, PrimaryKeyRow>(sql)
                .bind(schema_name)
                .bind(&table_name)
                .fetch_all(self.pool)
                .await?;

            if !pk_rows.is_empty() {
                table.set_primary_key(PrimaryKey {
                    name: Some(pk_rows[0].constraint_name.clone()),
                    columns: pk_rows.iter().map(|r| r.column_name.clone()).collect(),
                });
            }

            tables.insert(table_name, table);
        }

        Ok(tables)
    }

    async fn analyze_views(&self, schema_name: Option<&str>) -> Result<IndexMap<String, View>> {
        let mut views = IndexMap::new();

        let sql = r#"
            SELECT
                table_name AS table_name,
                view_definition AS view_definition
            FROM information_schema.views
            WHERE table_schema = COALESCE(?, DATABASE())
            ORDER BY table_name
        "#;

        let view_rows = sqlx::query_as::<_, ViewRow>(sql)
            .bind(schema_name)
            .fetch_all(self.pool)
            .await?;

        for row in view_rows {
            let view = View::new(&row.table_name, row.view_definition.as_deref().unwrap_or(""));
            views.insert(row.table_name, view);
        }

        Ok(views)
    }
}

// Row types for SQLite pragmas and sqlite_master

#[derive(FromRow)]
struct SqliteTableRow {
    name: String,
}

#[derive(FromRow)]
struct SqliteColumnRow {
    name: String,
    #[sqlx(rename = "type")]
    data_type: String,
    notnull: i64,
    dflt_value: Option<String>,
    pk: i64,
}

#[derive(FromRow)]
struct SqliteViewRow {
    name: String,
    sql: Option<String>,
}

/// SQLite schema analyzer
struct SqliteAnalyzer<'a> {
    pool: &'a Pool<Sqlite>,
}

#[async_trait]
impl<'a> Analyzer for SqliteAnalyzer<'a> {
    async fn analyze_schema(&self, schema_name: Option<&str>) -> Result<DatabaseSchema> {
        let mut db_schema = DatabaseSchema::new(schema_name.map(|s| s.to_string()));

        db_schema.tables = self.analyze_tables(schema_name).await?;
        db_schema.views = self.analyze_views(schema_name).await?;

        Ok(db_schema)
    }

    async fn analyze_tables(&self, _schema_name: Option<&str>) -> Result<IndexMap<String, Table>> {
        let mut tables = IndexMap::new();

        let sql = r#"
            SELECT name FROM sqlite_master
            WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
            ORDER BY name
        "#;

        let table_rows = sqlx::query_as::<_, SqliteTableRow>(sql)
            .fetch_all(self.pool)
            .await?;

        for row in table_rows {
            let table_name = row.name;
            let mut table = Table::new(&table_name);

            // table_info reports columns in declaration order and flags the
            // primary-key members with a 1-based position in `pk`
            let sql = format!("PRAGMA table_info(\"{}\")", table_name);

            let column_rows = sqlx::query_as::<_, SqliteColumnRow>(&sql)
                .fetch_all(self.pool)
                .await?;

            let mut pk_columns = Vec::new();
            for col in column_rows {
                if col.pk > 0 {
                    pk_columns.push(col.name.clone());
                }

                table.add_column(Column {
                    name: col.name,
                    data_type: col.data_type,
                    nullable: col.notnull == 0,
                    default: col.dflt_value,
                    comment: None,
                    is_unique: false,
                });
            }

            if !pk_columns.is_empty() {
                table.set_primary_key(PrimaryKey {
                    name: None,
                    columns: pk_columns,
                });
            }

            tables.insert(table_name, table);
        }

        Ok(tables)
    }

    async fn analyze_views(&self, _schema_name: Option<&str>) -> Result<IndexMap<String, View>> {
        let mut views = IndexMap::new();

        let sql = r#"
            SELECT name, sql FROM sqlite_master
            WHERE type = 'view'
            ORDER BY name
        "#;

        let view_rows = sqlx::query_as::<_, SqliteViewRow>(sql)
            .fetch_all(self.pool)
            .await?;

        for row in view_rows {
            let view = View::new(&row.name, row.sql.as_deref().unwrap_or(""));
            views.insert(row.name, view);
        }

        Ok(views)
    }
}
