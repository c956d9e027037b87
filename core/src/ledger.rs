//! The migration ledger table.
//!
//! One row per applied migration, holding the scripts exactly as they were
//! when the migration ran:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS {table} (
//!     id INTEGER PRIMARY KEY,
//!     name TEXT NOT NULL,
//!     up TEXT NOT NULL,
//!     down TEXT NOT NULL
//! );
//! ```
//!
//! Rows are inserted by an apply step and deleted by a revert step, never
//! updated. Every function validates the table name before building SQL.

use tracing::debug;

use crate::driver::{Driver, Row, Value};
use crate::error::{MigrateError, Result};
use crate::types::LedgerRecord;
use crate::validate::validate_table_name;

/// Generates the `CREATE TABLE IF NOT EXISTS` statement for the ledger.
///
/// # Errors
///
/// Returns [`MigrateError::InvalidTableName`] if `table` is not a plain
/// identifier.
pub fn ledger_table_sql(table: &str) -> Result<String> {
    validate_table_name(table)?;
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {table} (\n    \
         id INTEGER PRIMARY KEY,\n    \
         name TEXT NOT NULL,\n    \
         up TEXT NOT NULL,\n    \
         down TEXT NOT NULL\n)"
    ))
}

/// Creates the ledger table if it does not exist yet. Safe to call repeatedly.
pub fn ensure_ledger_table<D: Driver + ?Sized>(driver: &mut D, table: &str) -> Result<()> {
    let sql = ledger_table_sql(table)?;
    driver.exec(&sql)?;
    Ok(())
}

/// Loads every ledger row ordered ascending by id.
pub fn load_ledger<D: Driver + ?Sized>(driver: &mut D, table: &str) -> Result<Vec<LedgerRecord>> {
    validate_table_name(table)?;
    let rows = driver.query(
        &format!("SELECT id, name, up, down FROM {table} ORDER BY id ASC"),
        &[],
    )?;
    let records = rows
        .iter()
        .map(record_from_row)
        .collect::<Result<Vec<_>>>()?;
    debug!(table, count = records.len(), "loaded ledger");
    Ok(records)
}

/// Inserts a single ledger row.
///
/// # Errors
///
/// Returns [`MigrateError::DuplicateMigration`] if a row with the same id
/// already exists. Other constraint failures are plain
/// [`MigrateError::Driver`] errors.
pub fn insert_ledger_record<D: Driver + ?Sized>(
    driver: &mut D,
    table: &str,
    record: &LedgerRecord,
) -> Result<()> {
    validate_table_name(table)?;
    let params = [
        Value::Integer(record.id),
        Value::Text(record.name.clone()),
        Value::Text(record.up.clone()),
        Value::Text(record.down.clone()),
    ];
    driver
        .run(
            &format!("INSERT INTO {table} (id, name, up, down) VALUES (?1, ?2, ?3, ?4)"),
            &params,
        )
        .map_err(|source| {
            if source.is_unique_violation() {
                MigrateError::DuplicateMigration {
                    id: record.id,
                    source,
                }
            } else {
                MigrateError::Driver(source)
            }
        })?;
    Ok(())
}

/// Deletes the ledger row for `id`, returning how many rows were removed.
///
/// Deleting an id that is not present is not an error.
pub fn delete_ledger_record<D: Driver + ?Sized>(driver: &mut D, table: &str, id: i64) -> Result<u64> {
    validate_table_name(table)?;
    let result = driver.run(
        &format!("DELETE FROM {table} WHERE id = ?1"),
        &[Value::Integer(id)],
    )?;
    Ok(result.changes)
}

fn record_from_row(row: &Row) -> Result<LedgerRecord> {
    let id = row
        .get_i64("id")
        .ok_or_else(|| MigrateError::MalformedLedger(format!("missing integer id in {row:?}")))?;
    let text = |column: &str| {
        row.get_str(column).map(str::to_string).ok_or_else(|| {
            MigrateError::MalformedLedger(format!("row {id}: column '{column}' is not text"))
        })
    };
    Ok(LedgerRecord {
        id,
        name: text("name")?,
        up: text("up")?,
        down: text("down")?,
    })
}
