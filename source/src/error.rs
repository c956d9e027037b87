//! Error types for migration source operations.
//!
//! Provides a unified error type covering directory and file I/O, migration
//! file parsing, and configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading migration sources.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The migrations directory could not be listed.
    #[error("failed to read migrations directory '{path}': {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A migration file could not be read.
    #[error("failed to read migration file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A migration file has no `-- down` separator line.
    #[error("migration {id} ({name}) has no '-- down' separator")]
    MissingDownMarker { id: i64, name: String },

    /// A filename id is zero or does not fit in a 64-bit integer.
    #[error("invalid migration id '{digits}' in '{file}': ids must be positive 64-bit integers")]
    InvalidId { digits: String, file: String },

    /// Two files resolve to the same numeric id.
    #[error("duplicate migration id {id}: '{first}' and '{second}'")]
    DuplicateId {
        id: i64,
        first: String,
        second: String,
    },

    /// A new migration name is empty after sanitizing.
    #[error("invalid migration name '{0}'")]
    InvalidName(String),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Convenience alias for results with [`SourceError`].
pub type Result<T> = std::result::Result<T, SourceError>;
