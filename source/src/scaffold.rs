//! Creation of new, empty migration files.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Result, SourceError};
use crate::reader::discover_migrations;

const TEMPLATE: &str = "-- Up\n\n\n-- Down\n\n";

/// Writes `<next id>.<name>.sql` into `dir` with an empty up/down template.
///
/// The next id is one above the highest existing id, zero-padded to three
/// digits. `dir` is created if it does not exist. The name is lowercased and
/// every character outside `[a-z0-9_-]` becomes `-`.
///
/// # Errors
///
/// Returns [`SourceError::InvalidName`] if nothing usable is left of the
/// name, [`SourceError::InvalidId`] if the highest existing id is
/// `i64::MAX`, plus any error from reading the existing migrations.
///
/// # Examples
///
/// ```no_run
/// use sqlmigrate_source::create_migration;
///
/// let path = create_migration("migrations", "add users").unwrap();
/// assert!(path.ends_with("001.add-users.sql"));
/// ```
pub fn create_migration(dir: impl AsRef<Path>, name: &str) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let sanitized = sanitize_name(name);
    if sanitized.is_empty() {
        return Err(SourceError::InvalidName(name.to_string()));
    }

    std::fs::create_dir_all(dir)?;
    let next_id = match discover_migrations(dir)?.last() {
        None => 1,
        Some(last) => last.id.checked_add(1).ok_or_else(|| {
            let digits = (last.id as u64 + 1).to_string();
            SourceError::InvalidId {
                file: format!("{digits}.{sanitized}.sql"),
                digits,
            }
        })?,
    };

    let path = dir.join(format!("{next_id:03}.{sanitized}.sql"));
    std::fs::write(&path, TEMPLATE)?;
    info!(path = %path.display(), id = next_id, "created migration");
    Ok(path)
}

fn sanitize_name(raw: &str) -> String {
    let replaced: String = raw
        .trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    replaced.trim_matches('-').to_string()
}
