//! Reconciliation of source definitions against the ledger.
//!
//! A call runs in two phases that never interleave:
//!
//! 1. **Revert.** The ledger is walked from the highest id down. A record is
//!    reverted when its id no longer exists in source (orphaned) or when
//!    [`Force::Last`] targets it. The walk stops at the first record that is
//!    neither, so only a contiguous run at the top of the ledger is ever
//!    reverted; an orphan below a current migration stays in place.
//! 2. **Apply.** Every definition whose id is above the highest id left in
//!    the ledger is applied in ascending order.
//!
//! Each step is its own transaction: the script and the ledger mutation
//! commit together or not at all. The first failure aborts the call.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::driver::Driver;
use crate::error::{MigrateError, Result};
use crate::ledger::{delete_ledger_record, ensure_ledger_table, insert_ledger_record, load_ledger};
use crate::transaction::in_transaction;
use crate::types::{Direction, Force, LedgerRecord, MigrateOptions, MigrationDefinition, MigrationReport};
use crate::validate::{ordered_definitions, validate_table_name};

/// Brings the ledger in line with `definitions`.
///
/// `definitions` may be in any order; ids must be positive and unique. An
/// empty slice returns immediately without touching the database, not even
/// to create the ledger table.
///
/// # Errors
///
/// Argument errors ([`MigrateError::InvalidTableName`],
/// [`MigrateError::InvalidDefinitionId`],
/// [`MigrateError::DuplicateDefinition`]) are raised before any I/O. A
/// failing script is reported as [`MigrateError::Script`] after its step
/// has been rolled back; steps committed earlier in the call stay committed.
///
/// # Examples
///
/// ```no_run
/// use sqlmigrate_core::{Driver, MigrateOptions, MigrationDefinition, migrate};
///
/// fn run(driver: &mut impl Driver) -> sqlmigrate_core::Result<()> {
///     let definitions = vec![MigrationDefinition::new(
///         1,
///         "initial",
///         "CREATE TABLE users (id INTEGER PRIMARY KEY)",
///         "DROP TABLE users",
///     )];
///     let report = migrate(driver, &definitions, &MigrateOptions::default())?;
///     println!("applied {:?}", report.applied);
///     Ok(())
/// }
/// ```
pub fn migrate<D: Driver + ?Sized>(
    driver: &mut D,
    definitions: &[MigrationDefinition],
    options: &MigrateOptions,
) -> Result<MigrationReport> {
    let table = options.table_name.as_str();
    validate_table_name(table)?;
    let ordered = ordered_definitions(definitions)?;

    let mut report = MigrationReport::default();
    if ordered.is_empty() {
        debug!("no migration definitions, nothing to reconcile");
        return Ok(report);
    }

    ensure_ledger_table(driver, table)?;
    let ledger = load_ledger(driver, table)?;
    let plan = RevertPlan::new(&ordered, options.force);
    let revert = plan.count(&ledger);

    for record in ledger.iter().rev().take(revert) {
        let orphaned = plan.is_orphaned(record);
        let forced = plan.is_forced(record);
        info!(id = record.id, name = %record.name, orphaned, forced, "reverting migration");
        revert_step(driver, table, record)?;
        report.reverted.push(record.id);
    }

    let kept = &ledger[..ledger.len() - revert];
    let last_applied_id = kept.last().map_or(0, |record| record.id);
    for def in ordered.into_iter().filter(|def| def.id > last_applied_id) {
        info!(id = def.id, name = %def.name, "applying migration");
        apply_step(driver, table, LedgerRecord::capture(def))?;
        report.applied.push(def.id);
    }

    info!(
        reverted = report.reverted.len(),
        applied = report.applied.len(),
        "reconciliation complete"
    );
    Ok(report)
}

/// Decides which ledger records the revert phase removes.
///
/// A record qualifies when its id is missing from source or when
/// [`Force::Last`] is set and its id equals the highest source id. Only the
/// run of qualifying records at the top of the ledger is reverted.
pub(crate) struct RevertPlan {
    known: HashSet<i64>,
    forced_id: Option<i64>,
}

impl RevertPlan {
    /// `ordered` must be sorted ascending.
    pub(crate) fn new(ordered: &[&MigrationDefinition], force: Option<Force>) -> Self {
        let forced_id = match force {
            Some(Force::Last) => ordered.last().map(|def| def.id),
            None => None,
        };
        Self {
            known: ordered.iter().map(|def| def.id).collect(),
            forced_id,
        }
    }

    pub(crate) fn is_orphaned(&self, record: &LedgerRecord) -> bool {
        !self.known.contains(&record.id)
    }

    pub(crate) fn is_forced(&self, record: &LedgerRecord) -> bool {
        self.forced_id == Some(record.id)
    }

    /// Number of records, counted from the top of the ascending `ledger`,
    /// that would be reverted.
    pub(crate) fn count(&self, ledger: &[LedgerRecord]) -> usize {
        ledger
            .iter()
            .rev()
            .take_while(|record| self.is_orphaned(record) || self.is_forced(record))
            .count()
    }
}

/// Runs the stored down script and removes the ledger row, atomically.
fn revert_step<D: Driver + ?Sized>(driver: &mut D, table: &str, record: &LedgerRecord) -> Result<()> {
    in_transaction(driver, |d| {
        d.exec(&record.down)
            .map_err(|source| script_error(record, Direction::Down, source))?;
        delete_ledger_record(d, table, record.id)?;
        Ok(())
    })
}

/// Runs the up script and records the snapshot, atomically.
fn apply_step<D: Driver + ?Sized>(driver: &mut D, table: &str, record: LedgerRecord) -> Result<()> {
    in_transaction(driver, |d| {
        d.exec(&record.up)
            .map_err(|source| script_error(&record, Direction::Up, source))?;
        insert_ledger_record(d, table, &record)
    })
}

fn script_error(
    record: &LedgerRecord,
    direction: Direction,
    source: crate::driver::DriverError,
) -> MigrateError {
    MigrateError::Script {
        id: record.id,
        name: record.name.clone(),
        direction,
        source,
    }
}
