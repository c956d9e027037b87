//! Argument validation performed before any I/O.
//!
//! The ledger table name is interpolated into SQL, so it is restricted to a
//! plain identifier. Definitions must carry positive, unique ids so the
//! numeric ordering the reconciler relies on is total.

use std::collections::HashMap;

use crate::error::{MigrateError, Result};
use crate::types::MigrationDefinition;

/// Validates that a table name is a plain SQL identifier.
///
/// # Examples
///
/// ```
/// use sqlmigrate_core::validate_table_name;
///
/// assert!(validate_table_name("migrations").is_ok());
/// assert!(validate_table_name("_schema_v2").is_ok());
/// assert!(validate_table_name("drop;--").is_err());
/// ```
pub fn validate_table_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(MigrateError::InvalidTableName(name.to_string()));
    }
    Ok(())
}

/// Checks ids and returns the definitions ordered ascending by id.
///
/// The input may be in any order; the returned references are sorted
/// numerically.
pub(crate) fn ordered_definitions(
    definitions: &[MigrationDefinition],
) -> Result<Vec<&MigrationDefinition>> {
    let mut seen: HashMap<i64, &str> = HashMap::with_capacity(definitions.len());
    for def in definitions {
        if def.id <= 0 {
            return Err(MigrateError::InvalidDefinitionId {
                id: def.id,
                name: def.name.clone(),
            });
        }
        if let Some(first) = seen.insert(def.id, &def.name) {
            return Err(MigrateError::DuplicateDefinition {
                id: def.id,
                first: first.to_string(),
                second: def.name.clone(),
            });
        }
    }

    let mut ordered: Vec<&MigrationDefinition> = definitions.iter().collect();
    ordered.sort_by_key(|def| def.id);
    Ok(ordered)
}
