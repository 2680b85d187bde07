//! Explicit transaction scopes
//!
//! A unit of work groups store writes so that they become visible together
//! or not at all. Scopes nest: an inner scope commits into the outer one,
//! and rolling back the outer scope discards the inner writes too.

use crate::errors::Result;

/// Transaction boundary of a store
pub trait UnitOfWork {
    fn begin(&mut self) -> Result<()>;

    fn commit(&mut self) -> Result<()>;

    fn rollback(&mut self) -> Result<()>;

    /// Number of open scopes
    fn depth(&self) -> usize;
}

/// Run `work` inside a unit of work
///
/// Commits when `work` returns `Ok`; rolls back and returns the original
/// error otherwise. A failing rollback is logged, never returned in place of
/// the error that caused it.
pub fn in_transaction<U, T, F>(uow: &mut U, work: F) -> Result<T>
where
    U: UnitOfWork + ?Sized,
    F: FnOnce(&mut U) -> Result<T>,
{
    uow.begin()?;
    match work(uow) {
        Ok(value) => {
            uow.commit()?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = uow.rollback() {
                tracing::warn!(
                    component = module_path!(),
                    error = %rollback_err,
                    "rollback failed after unit of work error"
                );
            }
            Err(err)
        }
    }
}
