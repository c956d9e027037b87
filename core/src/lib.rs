//! Ledger-based SQL migration reconciliation.
//!
//! This crate holds the engine-independent part of `sqlmigrate`:
//!
//! - [`MigrationDefinition`]: a migration as declared in source (id, name,
//!   up script, down script).
//! - [`LedgerRecord`]: a row of the ledger table, snapshotting the scripts
//!   at apply time.
//! - [`Driver`]: the SQL execution capability the engine consumes
//!   (`exec`, `run`, `query`).
//! - [`migrate`]: the reconciler: reverts orphaned or forced migrations
//!   from the top of the ledger, then applies pending ones, one transaction
//!   per step.
//! - [`status`]: a read-only comparison of source and ledger.
//!
//! A SQLite driver lives in the `sqlmigrate-sqlite` crate; migration files
//! are read by `sqlmigrate-source`.
//!
//! # Example
//!
//! ```no_run
//! use sqlmigrate_core::*;
//!
//! fn upgrade(driver: &mut impl Driver) -> Result<()> {
//!     let definitions = vec![
//!         MigrationDefinition::new(1, "users", "CREATE TABLE users (id INTEGER)", "DROP TABLE users"),
//!         MigrationDefinition::new(2, "posts", "CREATE TABLE posts (id INTEGER)", "DROP TABLE posts"),
//!     ];
//!     let options = MigrateOptions::default().with_table_name("schema_ledger");
//!     let report = migrate(driver, &definitions, &options)?;
//!     assert!(report.reverted.is_empty());
//!     Ok(())
//! }
//! ```

mod driver;
mod error;
pub mod ledger;
mod reconcile;
mod status;
pub mod transaction;
mod types;
mod validate;

pub use driver::{Driver, DriverError, DriverErrorKind, Row, RunResult, Value};
pub use error::{MigrateError, Result};
pub use reconcile::migrate;
pub use status::{AppliedMigration, MigrationStatus, status};
pub use types::*;
pub use validate::validate_table_name;
