//! Error types for migration reconciliation.
//!
//! Every failure aborts the current run and is returned unchanged to the
//! caller; nothing is retried or swallowed.

use thiserror::Error;

use crate::driver::DriverError;
use crate::types::Direction;

/// Errors that can occur while reading or reconciling the ledger.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// A statement issued by the reconciler itself failed.
    #[error("driver error: {0}")]
    Driver(#[from] DriverError),

    /// A migration script failed while being applied or reverted.
    #[error("migration {id} ({name}) failed while running {direction}: {source}")]
    Script {
        id: i64,
        name: String,
        direction: Direction,
        #[source]
        source: DriverError,
    },

    /// The ledger already holds a row for this id.
    #[error("migration {id} is already recorded in the ledger: {source}")]
    DuplicateMigration {
        id: i64,
        #[source]
        source: DriverError,
    },

    /// Rolling back a failed step failed as well. Both errors are kept.
    #[error("{source}; rollback also failed: {rollback}")]
    RollbackFailed {
        #[source]
        source: Box<MigrateError>,
        rollback: DriverError,
    },

    /// A ledger row did not have the expected shape.
    #[error("malformed ledger row: {0}")]
    MalformedLedger(String),

    /// Ledger table name is empty or contains characters outside `[A-Za-z0-9_]`.
    #[error(
        "invalid table name '{0}': must be non-empty, start with a letter or underscore, and contain only alphanumeric characters and underscores"
    )]
    InvalidTableName(String),

    /// Migration ids must be positive.
    #[error("invalid migration id {id} for '{name}': ids must be positive")]
    InvalidDefinitionId { id: i64, name: String },

    /// Two definitions share an id.
    #[error("duplicate migration id {id}: '{first}' and '{second}'")]
    DuplicateDefinition {
        id: i64,
        first: String,
        second: String,
    },
}

/// Convenience alias for results with [`MigrateError`].
pub type Result<T> = std::result::Result<T, MigrateError>;
