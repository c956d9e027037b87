//! Migration directory discovery.
//!
//! Scans a directory for `<id>.<name>.sql` files, parses each one and
//! returns the definitions ordered by numeric id. Every file must parse
//! before anything is returned, so a single malformed migration stops the
//! whole scan before the database is touched.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sqlmigrate_core::MigrationDefinition;
use tracing::debug;

use crate::error::{Result, SourceError};
use crate::parse::{parse_filename, parse_id, parse_migration};

/// A migration file found on disk, before its contents are read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    /// Numeric id from the filename.
    pub id: i64,
    /// Name from the filename.
    pub name: String,
    /// Full path to the file.
    pub path: PathBuf,
}

/// Lists migration files in `dir`, ascending by numeric id.
///
/// Entries whose names do not match `<digits>.<name>.sql`, and directories,
/// are skipped. Symlinks are followed; a dangling one fails when read.
///
/// # Errors
///
/// Returns [`SourceError::ReadDir`] if the directory cannot be listed,
/// [`SourceError::InvalidId`] for a zero or overflowing id, and
/// [`SourceError::DuplicateId`] if two files share an id.
pub fn discover_migrations(dir: impl AsRef<Path>) -> Result<Vec<MigrationFile>> {
    let dir = dir.as_ref();
    let read_dir_error = |source| SourceError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    let mut seen: HashMap<i64, String> = HashMap::new();

    for entry in std::fs::read_dir(dir).map_err(read_dir_error)? {
        let entry = entry.map_err(read_dir_error)?;
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        let Some((digits, name)) = parse_filename(file_name) else {
            debug!(file = file_name, "skipping non-migration entry");
            continue;
        };
        let path = entry.path();
        if path.is_dir() {
            debug!(file = file_name, "skipping directory entry");
            continue;
        }

        let id = parse_id(digits, file_name)?;
        if let Some(first) = seen.insert(id, file_name.to_string()) {
            return Err(SourceError::DuplicateId {
                id,
                first,
                second: file_name.to_string(),
            });
        }
        files.push(MigrationFile {
            id,
            name: name.to_string(),
            path,
        });
    }

    files.sort_by_key(|file| file.id);
    debug!(dir = %dir.display(), count = files.len(), "discovered migration files");
    Ok(files)
}

/// Reads and parses every migration in `dir`.
///
/// Returns an empty vector when the directory holds no migration files.
///
/// # Errors
///
/// Everything [`discover_migrations`] returns, plus
/// [`SourceError::ReadFile`] for unreadable files and
/// [`SourceError::MissingDownMarker`] for files without a down separator.
///
/// # Examples
///
/// ```no_run
/// use sqlmigrate_source::read_migrations;
///
/// let definitions = read_migrations("migrations").unwrap();
/// for def in &definitions {
///     println!("{} {}", def.id, def.name);
/// }
/// ```
pub fn read_migrations(dir: impl AsRef<Path>) -> Result<Vec<MigrationDefinition>> {
    discover_migrations(dir)?
        .into_iter()
        .map(|file| {
            let text = std::fs::read_to_string(&file.path).map_err(|source| SourceError::ReadFile {
                path: file.path.clone(),
                source,
            })?;
            parse_migration(file.id, &file.name, &text)
        })
        .collect()
}
