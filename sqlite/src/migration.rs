//! Directory-driven migration runs against SQLite.
//!
//! [`Migrator`] ties the pieces together: it reads the configured migrations
//! directory, then hands the definitions and an owned [`SqliteDriver`] to
//! the reconciler. Each run re-reads the directory, so edits between runs
//! are picked up.
//!
//! # Example
//!
//! ```no_run
//! use sqlmigrate_source::MigrateConfig;
//! use sqlmigrate_sqlite::{Migrator, SqliteDriver};
//!
//! let driver = SqliteDriver::open("app.db").unwrap();
//! let mut migrator = Migrator::new(driver, MigrateConfig::default(), ".").unwrap();
//!
//! let report = migrator.up().unwrap();
//! println!("applied {:?}, reverted {:?}", report.applied, report.reverted);
//!
//! let status = migrator.status().unwrap();
//! println!("pending: {:?}", status.pending);
//!
//! migrator.into_driver().close().unwrap();
//! ```

use std::path::{Path, PathBuf};

use sqlmigrate_core::{
    MigrationDefinition, MigrationReport, MigrationStatus, migrate, status, validate_table_name,
};
use sqlmigrate_source::{MigrateConfig, read_migrations};
use tracing::info;

use crate::driver::SqliteDriver;
use crate::error::Result;

/// Runs the migrations of one project against one SQLite database.
pub struct Migrator {
    driver: SqliteDriver,
    config: MigrateConfig,
    root: PathBuf,
}

impl Migrator {
    /// Creates a migrator for the project rooted at `root`.
    ///
    /// The migrations directory is `config.migrations_path` resolved
    /// against `root`.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::InvalidTableName`](sqlmigrate_core::MigrateError::InvalidTableName)
    /// if the configured ledger table name is not a plain identifier.
    pub fn new(driver: SqliteDriver, config: MigrateConfig, root: impl Into<PathBuf>) -> Result<Self> {
        validate_table_name(&config.table_name)?;
        Ok(Self {
            driver,
            config,
            root: root.into(),
        })
    }

    /// Returns the directory migrations are read from.
    pub fn migrations_dir(&self) -> PathBuf {
        self.config.resolve_migrations_path(&self.root)
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &MigrateConfig {
        &self.config
    }

    /// Reads the migrations directory and reconciles the ledger with it.
    ///
    /// An empty directory leaves the database untouched.
    pub fn up(&mut self) -> Result<MigrationReport> {
        let definitions = self.read_definitions()?;
        self.up_with(&definitions)
    }

    /// Reconciles the ledger with definitions supplied by the caller.
    pub fn up_with(&mut self, definitions: &[MigrationDefinition]) -> Result<MigrationReport> {
        let report = migrate(&mut self.driver, definitions, &self.config.options())?;
        if report.is_noop() {
            info!("database is up to date");
        }
        Ok(report)
    }

    /// Compares the migrations directory with the ledger.
    pub fn status(&mut self) -> Result<MigrationStatus> {
        let definitions = self.read_definitions()?;
        Ok(status(&mut self.driver, &definitions, &self.config.options())?)
    }

    /// Returns a reference to the driver.
    pub fn driver(&self) -> &SqliteDriver {
        &self.driver
    }

    /// Returns a mutable reference to the driver.
    pub fn driver_mut(&mut self) -> &mut SqliteDriver {
        &mut self.driver
    }

    /// Consumes the migrator and returns the driver.
    pub fn into_driver(self) -> SqliteDriver {
        self.driver
    }

    fn read_definitions(&self) -> Result<Vec<MigrationDefinition>> {
        Ok(read_migrations(self.migrations_dir())?)
    }

    /// Returns the project root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}
