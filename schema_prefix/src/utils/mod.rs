//! Utilities for schema_prefix

pub mod logging;

// Re-export key utility functions
pub use logging::init_logging;
