//! Database module for schema_prefix
//!
//! This module handles database connections and the physical side of
//! deferred table drops.

pub mod connection;

// Re-export key types
pub use connection::{DatabaseConnection, DatabasePool, SchemaConnection};
