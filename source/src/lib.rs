//! Migration file discovery, parsing and configuration.
//!
//! Migrations live in a directory as `<id>.<name>.sql` files, each holding
//! an up script, a `-- down` separator line, and a down script. This crate
//! turns such a directory into the ordered
//! [`MigrationDefinition`](sqlmigrate_core::MigrationDefinition) list the
//! reconciler consumes.
//!
//! # Quick start
//!
//! ```no_run
//! use sqlmigrate_source::{MigrateConfig, read_migrations};
//!
//! let config = MigrateConfig::load_or_default(".").unwrap();
//! let definitions = read_migrations(config.resolve_migrations_path(".")).unwrap();
//! println!("{} migrations", definitions.len());
//! ```
//!
//! # Layout
//!
//! - **`parse`**: filename and file content parsing
//! - **`reader`**: directory scanning and ordering
//! - **`config`**: YAML run configuration
//! - **`scaffold`**: creating new migration files

mod config;
mod error;
mod parse;
mod reader;
mod scaffold;

pub use config::{DEFAULT_CONFIG_FILE, DEFAULT_MIGRATIONS_PATH, MigrateConfig};
pub use error::{Result, SourceError};
pub use parse::{parse_filename, parse_migration};
pub use reader::{MigrationFile, discover_migrations, read_migrations};
pub use scaffold::create_migration;
