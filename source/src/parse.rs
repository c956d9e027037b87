//! Migration filename and content parsing.
//!
//! A migration file is named `<id>.<name>.sql` and holds the up script, a
//! separator line, and the down script:
//!
//! ```sql
//! -- Up
//! CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT NOT NULL);
//!
//! -- Down
//! DROP TABLE users;
//! ```
//!
//! The separator is `--`, whitespace, then `down` at the start of a line,
//! matched case-insensitively. Lines starting with `-- ` are comments and
//! are removed from the up script only.

use std::sync::LazyLock;

use regex::Regex;
use sqlmigrate_core::MigrationDefinition;

use crate::error::{Result, SourceError};

static FILENAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.(.+)\.sql$").expect("filename pattern is valid"));

static DOWN_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^--\s+down\b").expect("down marker pattern is valid"));

/// Splits a migration filename into its id digits and name.
///
/// Returns `None` for names that do not match `<digits>.<name>.sql`. The
/// digits are returned unparsed so the caller can report overflow.
///
/// # Examples
///
/// ```
/// use sqlmigrate_source::parse_filename;
///
/// assert_eq!(parse_filename("001.initial.sql"), Some(("001", "initial")));
/// assert_eq!(parse_filename("12.add.index.sql"), Some(("12", "add.index")));
/// assert_eq!(parse_filename("README.md"), None);
/// assert_eq!(parse_filename("initial.sql"), None);
/// ```
pub fn parse_filename(filename: &str) -> Option<(&str, &str)> {
    let caps = FILENAME_RE.captures(filename)?;
    let digits = caps.get(1)?.as_str();
    let name = caps.get(2)?.as_str();
    Some((digits, name))
}

/// Parses filename id digits into a positive id.
pub(crate) fn parse_id(digits: &str, file: &str) -> Result<i64> {
    match digits.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(SourceError::InvalidId {
            digits: digits.to_string(),
            file: file.to_string(),
        }),
    }
}

/// Builds a definition from the text of a migration file.
///
/// # Errors
///
/// Returns [`SourceError::MissingDownMarker`] if the text has no down
/// separator.
///
/// # Examples
///
/// ```
/// use sqlmigrate_source::parse_migration;
///
/// let text = "-- Up\nCREATE TABLE t (x);\n\n-- Down\nDROP TABLE t;\n";
/// let def = parse_migration(1, "initial", text).unwrap();
/// assert_eq!(def.up, "CREATE TABLE t (x);");
/// assert_eq!(def.down, "DROP TABLE t;");
/// ```
pub fn parse_migration(id: i64, name: &str, text: &str) -> Result<MigrationDefinition> {
    let marker = DOWN_MARKER_RE
        .find(text)
        .ok_or_else(|| SourceError::MissingDownMarker {
            id,
            name: name.to_string(),
        })?;

    let up = strip_comment_lines(&text[..marker.start()]);
    let down = text[marker.end()..].trim();

    Ok(MigrationDefinition::new(id, name, up.trim(), down))
}

fn strip_comment_lines(sql: &str) -> String {
    sql.lines()
        .filter(|line| !line.starts_with("-- "))
        .collect::<Vec<_>>()
        .join("\n")
}
