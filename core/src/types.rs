//! Migration type definitions.
//!
//! This module defines the data model shared by every crate in the
//! workspace: what a migration looks like when read from source, what a
//! ledger row looks like once applied, and the options and reports that
//! flow through a reconciliation run.

use serde::{Deserialize, Serialize};

/// Default name of the ledger table.
pub const DEFAULT_TABLE_NAME: &str = "migrations";

/// A migration as declared by its source file.
///
/// The `up` script has already had its `-- ` comment lines stripped; both
/// scripts are trimmed.
///
/// # Examples
///
/// ```
/// use sqlmigrate_core::MigrationDefinition;
///
/// let def = MigrationDefinition::new(
///     2,
///     "add-users",
///     "CREATE TABLE users (id INTEGER PRIMARY KEY)",
///     "DROP TABLE users",
/// );
/// assert_eq!(def.id, 2);
/// assert_eq!(def.name, "add-users");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationDefinition {
    /// Numeric id parsed from the filename prefix. Defines total order.
    pub id: i64,
    /// Descriptive name parsed from the filename.
    pub name: String,
    /// SQL applied when the migration runs forward.
    pub up: String,
    /// SQL applied when the migration is reverted.
    pub down: String,
}

impl MigrationDefinition {
    /// Creates a definition from its parts.
    pub fn new(
        id: i64,
        name: impl Into<String>,
        up: impl Into<String>,
        down: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            up: up.into(),
            down: down.into(),
        }
    }
}

/// A row of the ledger table.
///
/// The scripts are a snapshot taken when the migration was applied. Reverts
/// always run the stored `down`, so editing or deleting the source file
/// later cannot change what an undo does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Primary key; the definition id at apply time.
    pub id: i64,
    /// Name at apply time.
    pub name: String,
    /// Up script at apply time.
    pub up: String,
    /// Down script at apply time.
    pub down: String,
}

impl LedgerRecord {
    /// Copies a definition into a new ledger record.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlmigrate_core::{LedgerRecord, MigrationDefinition};
    ///
    /// let mut def = MigrationDefinition::new(1, "init", "CREATE TABLE t (x)", "DROP TABLE t");
    /// let record = LedgerRecord::capture(&def);
    ///
    /// // Later edits to the definition do not leak into the snapshot.
    /// def.down.push_str("; DROP TABLE other");
    /// assert_eq!(record.down, "DROP TABLE t");
    /// ```
    pub fn capture(definition: &MigrationDefinition) -> Self {
        Self {
            id: definition.id,
            name: definition.name.clone(),
            up: definition.up.clone(),
            down: definition.down.clone(),
        }
    }

    /// Returns `true` if the stored scripts differ from `definition`.
    pub fn differs_from(&self, definition: &MigrationDefinition) -> bool {
        self.up != definition.up || self.down != definition.down
    }
}

/// Which already-applied migrations to revert even though they are current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Force {
    /// Revert and re-apply the migration with the highest id in source.
    Last,
}

/// Options for a single [`migrate`](crate::migrate) call.
///
/// # Examples
///
/// ```
/// use sqlmigrate_core::{Force, MigrateOptions};
///
/// let options = MigrateOptions::default();
/// assert_eq!(options.table_name, "migrations");
/// assert_eq!(options.force, None);
///
/// let forced = MigrateOptions::default().with_force(Force::Last);
/// assert_eq!(forced.force, Some(Force::Last));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrateOptions {
    /// Optional forced revert.
    pub force: Option<Force>,
    /// Name of the ledger table.
    pub table_name: String,
}

impl Default for MigrateOptions {
    fn default() -> Self {
        Self {
            force: None,
            table_name: DEFAULT_TABLE_NAME.to_string(),
        }
    }
}

impl MigrateOptions {
    /// Sets the forced revert mode.
    pub fn with_force(mut self, force: Force) -> Self {
        self.force = Some(force);
        self
    }

    /// Sets the ledger table name.
    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }
}

/// Direction a migration script runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

/// Outcome of a successful [`migrate`](crate::migrate) call.
///
/// Ids are listed in the order the steps were committed: reverts
/// descending, applies ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationReport {
    /// Ids reverted, in execution order.
    pub reverted: Vec<i64>,
    /// Ids applied, in execution order.
    pub applied: Vec<i64>,
}

impl MigrationReport {
    /// Returns `true` if the run committed nothing.
    pub fn is_noop(&self) -> bool {
        self.reverted.is_empty() && self.applied.is_empty()
    }
}
