//! Logging utilities for schema_prefix
//!
//! This module provides logging setup from configuration.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{Error, Result};

/// Initialize logging based on configuration
pub fn init_logging(config: &Option<LoggingConfig>) -> Result<()> {
    let config = match config {
        Some(cfg) => cfg,
        None => return Ok(()), // No logging configuration, use defaults
    };

    let level = match config.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let directive = format!("schema_prefix={}", level)
        .parse::<Directive>()
        .map_err(|e| Error::ConfigError(format!("Invalid log directive: {}", e)))?;
    let env_filter = EnvFilter::from_default_env().add_directive(directive);

    let writer = if let Some(file_path) = &config.file {
        if let Some(parent) = Path::new(file_path).parent() {
            std::fs::create_dir_all(parent)?;
        }

        BoxMakeWriter::new(Arc::new(File::create(file_path)?))
    } else if config.stdout {
        BoxMakeWriter::new(std::io::stdout)
    } else {
        return Ok(());
    };

    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(writer);

    if config.format.to_lowercase() == "json" {
        tracing::subscriber::set_global_default(builder.json().finish())
            .map_err(|e| Error::ConfigError(e.to_string()))?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())
            .map_err(|e| Error::ConfigError(e.to_string()))?;
    }

    Ok(())
}
