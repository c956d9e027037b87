//! Migration run configuration.
//!
//! Defines the YAML-serializable settings that control where migrations are
//! read from, which ledger table is used, and whether the last migration is
//! forced to re-run.
//!
//! # Example YAML
//!
//! ```yaml
//! migrations_path: db/migrations
//! table_name: schema_ledger
//! force: last
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sqlmigrate_core::{DEFAULT_TABLE_NAME, Force, MigrateOptions};

use crate::error::Result;

/// Default migrations directory, relative to the project root.
pub const DEFAULT_MIGRATIONS_PATH: &str = "migrations";

/// Conventional config file name looked up in the project root.
pub const DEFAULT_CONFIG_FILE: &str = "sqlmigrate.yml";

/// Top-level migration configuration.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use sqlmigrate_source::MigrateConfig;
///
/// let config = MigrateConfig::default();
/// assert_eq!(config.table_name, "migrations");
/// assert_eq!(
///     config.resolve_migrations_path(Path::new("/srv/app")),
///     Path::new("/srv/app/migrations"),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrateConfig {
    /// Directory holding migration files; relative paths are resolved
    /// against the project root.
    pub migrations_path: PathBuf,
    /// Ledger table name.
    pub table_name: String,
    /// Forced revert mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force: Option<Force>,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            migrations_path: PathBuf::from(DEFAULT_MIGRATIONS_PATH),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            force: None,
        }
    }
}

impl MigrateConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::SourceError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::SourceError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Loads `sqlmigrate.yml` from `root` if present, otherwise returns the
    /// defaults.
    pub fn load_or_default(root: impl AsRef<Path>) -> Result<Self> {
        let path = root.as_ref().join(DEFAULT_CONFIG_FILE);
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Returns the migrations directory resolved against `root`.
    ///
    /// Absolute paths are returned unchanged.
    pub fn resolve_migrations_path(&self, root: impl AsRef<Path>) -> PathBuf {
        root.as_ref().join(&self.migrations_path)
    }

    /// Builds the options for a reconciliation run.
    pub fn options(&self) -> MigrateOptions {
        MigrateOptions {
            force: self.force,
            table_name: self.table_name.clone(),
        }
    }
}
