//! Schema module for schema_prefix
//!
//! This module holds the in-memory schema model, the snapshot introspection
//! and the prefix-translating wrapper around them.

pub mod analyzer;
pub mod types;
pub mod wrapper;

// Re-export key types
pub use analyzer::SchemaAnalyzer;
pub use types::{
    Column, DatabaseSchema, ForeignKey, Index, PrimaryKey, SchemaOps, Table, View,
};
pub use wrapper::SchemaWrapper;
