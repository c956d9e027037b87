//! SQLite backend for `sqlmigrate`.
//!
//! This crate provides [`SqliteDriver`], a caller-owned `rusqlite`
//! connection implementing the [`Driver`](sqlmigrate_core::Driver)
//! capability, and [`Migrator`], which reads a project's migrations
//! directory and reconciles the database with it.
//!
//! # Architecture
//!
//! - **`driver`**: `exec`/`run`/`query` over `rusqlite`, error
//!   classification, column listing
//! - **`migration`**: directory-driven runs (up/status)
//!
//! # Quick start
//!
//! ```no_run
//! use sqlmigrate_source::MigrateConfig;
//! use sqlmigrate_sqlite::{Migrator, SqliteDriver};
//!
//! let driver = SqliteDriver::open("app.db").unwrap();
//! let config = MigrateConfig::load_or_default(".").unwrap();
//! let mut migrator = Migrator::new(driver, config, ".").unwrap();
//! migrator.up().unwrap();
//! ```
//!
//! # Ledger table
//!
//! Applied migrations are recorded in a table (default `migrations`) with
//! the columns `id`, `name`, `up` and `down`. Table names must be plain
//! identifiers.

mod driver;
mod error;
mod migration;

pub use driver::SqliteDriver;
pub use error::{Result, SqliteError};
pub use migration::Migrator;
