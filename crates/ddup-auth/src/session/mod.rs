//! Session ledger and its housekeeping.

pub mod cleanup;
pub mod ledger;

pub use cleanup::SessionCleanup;
pub use ledger::SessionLedger;
