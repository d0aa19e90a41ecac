//! Ledger export port trait.

use crate::domain::error::PipsimError;
use crate::domain::ledger::Ledger;

/// Port for persisting a finished ledger.
pub trait LedgerPort {
    fn write_ledger(&self, ledger: &Ledger, destination: &str) -> Result<(), PipsimError>;
}
