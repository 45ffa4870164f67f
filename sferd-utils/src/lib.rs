//! sferd utilities
//!
//! Shared plumbing for the sferd crates: logging setup, configuration file
//! loading and the string helpers used when building diagram labels.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod logging;
pub mod string;

pub use config::{load_config, merge_configs};
pub use logging::{init_logging, LogLevel, LoggerConfig};
pub use string::{collapse_whitespace, safe_truncate, sanitize_identifier};

/// Result type used throughout sferd utilities
pub type Result<T> = std::result::Result<T, UtilError>;

/// Error types for utility operations
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}
