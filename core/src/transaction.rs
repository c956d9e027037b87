//! Scoped transactions over a [`Driver`].
//!
//! [`Transaction`] issues `BEGIN` when created and guarantees that the
//! transaction is finished exactly once: by [`commit`](Transaction::commit),
//! by [`rollback`](Transaction::rollback), or by `Drop` if neither ran (an
//! early return, a failed commit, or a panic unwinding through the step).
//!
//! Most callers want [`in_transaction`], which commits on `Ok` and rolls back
//! on `Err`, reporting a failed rollback together with the original error.

use tracing::warn;

use crate::driver::{Driver, DriverError};
use crate::error::{MigrateError, Result};

/// An open transaction on a borrowed driver.
pub struct Transaction<'a, D: Driver + ?Sized> {
    driver: &'a mut D,
    finished: bool,
}

impl<'a, D: Driver + ?Sized> Transaction<'a, D> {
    /// Starts a transaction with `BEGIN`.
    pub fn begin(driver: &'a mut D) -> std::result::Result<Self, DriverError> {
        driver.exec("BEGIN")?;
        Ok(Self {
            driver,
            finished: false,
        })
    }

    /// The driver, for statements that belong to this transaction.
    pub fn driver(&mut self) -> &mut D {
        &mut *self.driver
    }

    /// Commits. If `COMMIT` fails the guard is dropped unfinished and rolls back.
    pub fn commit(mut self) -> std::result::Result<(), DriverError> {
        self.driver.exec("COMMIT")?;
        self.finished = true;
        Ok(())
    }

    /// Rolls back explicitly so that a failure can be reported.
    pub fn rollback(mut self) -> std::result::Result<(), DriverError> {
        self.finished = true;
        self.driver.exec("ROLLBACK")
    }
}

impl<D: Driver + ?Sized> Drop for Transaction<'_, D> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(err) = self.driver.exec("ROLLBACK") {
            warn!(error = %err, "rollback of abandoned transaction failed");
        }
    }
}

/// Runs `f` inside a transaction.
///
/// Commits when `f` returns `Ok`. When it returns `Err`, rolls back and
/// returns that error; if the rollback fails too, returns
/// [`MigrateError::RollbackFailed`] carrying both.
pub fn in_transaction<D, T, F>(driver: &mut D, f: F) -> Result<T>
where
    D: Driver + ?Sized,
    F: FnOnce(&mut D) -> Result<T>,
{
    let mut tx = Transaction::begin(driver)?;
    match f(tx.driver()) {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(err) => match tx.rollback() {
            Ok(()) => Err(err),
            Err(rollback) => Err(MigrateError::RollbackFailed {
                source: Box::new(err),
                rollback,
            }),
        },
    }
}
