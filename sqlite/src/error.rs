//! Error types for the SQLite backend.
//!
//! Provides a unified error type covering connection handling, migration
//! source reading, and reconciliation failures.

use thiserror::Error;

/// Errors that can occur while opening a database or running migrations.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// SQLite failure while opening or closing a connection.
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// A statement issued through the driver failed.
    #[error("driver error: {0}")]
    DriverError(#[from] sqlmigrate_core::DriverError),

    /// Reconciliation failure.
    #[error("migration error: {0}")]
    MigrationError(#[from] sqlmigrate_core::MigrateError),

    /// Migration files could not be read or parsed.
    #[error("source error: {0}")]
    SourceError(#[from] sqlmigrate_source::SourceError),
}

/// Convenience alias for results with [`SqliteError`].
pub type Result<T> = std::result::Result<T, SqliteError>;
