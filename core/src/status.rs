//! Read-only comparison of source definitions with the ledger.

use std::collections::HashMap;

use serde::Serialize;

use crate::driver::Driver;
use crate::error::Result;
use crate::ledger::{ensure_ledger_table, load_ledger};
use crate::reconcile::RevertPlan;
use crate::types::{MigrateOptions, MigrationDefinition};
use crate::validate::{ordered_definitions, validate_table_name};

/// Summary of an applied migration, without its scripts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedMigration {
    pub id: i64,
    pub name: String,
}

/// Snapshot of how the ledger relates to the current source.
///
/// `revertable` and `pending` are exactly what [`migrate`](crate::migrate)
/// with the same options would revert and then apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    /// Ledger rows, ascending.
    pub applied: Vec<AppliedMigration>,
    /// Ledger ids the next run reverts, in execution order (descending).
    pub revertable: Vec<i64>,
    /// Source ids the next run applies, ascending.
    pub pending: Vec<i64>,
    /// Ledger ids with no matching source definition, ascending. Orphans
    /// below a current migration are listed here but never reverted.
    pub orphaned: Vec<i64>,
    /// Ledger ids whose stored scripts differ from the current source.
    pub modified: Vec<i64>,
}

impl MigrationStatus {
    /// Highest applied id, or 0 if the ledger is empty.
    pub fn last_applied_id(&self) -> i64 {
        self.applied.last().map_or(0, |m| m.id)
    }

    /// Returns `true` if the next run would neither revert nor apply.
    pub fn is_up_to_date(&self) -> bool {
        self.revertable.is_empty() && self.pending.is_empty()
    }
}

/// Compares `definitions` with the ledger named in `options`.
///
/// Creates the ledger table if it is missing; performs no other writes. An
/// empty `definitions` slice plans nothing, matching `migrate`.
pub fn status<D: Driver + ?Sized>(
    driver: &mut D,
    definitions: &[MigrationDefinition],
    options: &MigrateOptions,
) -> Result<MigrationStatus> {
    let table = options.table_name.as_str();
    validate_table_name(table)?;
    let ordered = ordered_definitions(definitions)?;
    ensure_ledger_table(driver, table)?;
    let ledger = load_ledger(driver, table)?;

    let by_id: HashMap<i64, &MigrationDefinition> =
        ordered.iter().map(|def| (def.id, *def)).collect();
    let mut status = MigrationStatus::default();

    for record in &ledger {
        match by_id.get(&record.id) {
            Some(def) if record.differs_from(def) => status.modified.push(record.id),
            Some(_) => {}
            None => status.orphaned.push(record.id),
        }
        status.applied.push(AppliedMigration {
            id: record.id,
            name: record.name.clone(),
        });
    }

    if ordered.is_empty() {
        return Ok(status);
    }

    let revert = RevertPlan::new(&ordered, options.force).count(&ledger);
    status.revertable = ledger.iter().rev().take(revert).map(|r| r.id).collect();

    let last_kept_id = ledger[..ledger.len() - revert]
        .last()
        .map_or(0, |record| record.id);
    status.pending = ordered
        .iter()
        .map(|def| def.id)
        .filter(|id| *id > last_kept_id)
        .collect();

    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_up_to_date_ignores_buried_orphans() {
        let status = MigrationStatus {
            orphaned: vec![3],
            ..MigrationStatus::default()
        };
        assert!(status.is_up_to_date());
    }

    #[test]
    fn test_not_up_to_date_with_revertable() {
        let status = MigrationStatus {
            revertable: vec![5],
            ..MigrationStatus::default()
        };
        assert!(!status.is_up_to_date());
    }

    #[test]
    fn test_last_applied_id_empty() {
        assert_eq!(MigrationStatus::default().last_applied_id(), 0);
    }
}
