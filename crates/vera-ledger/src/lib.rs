pub mod entry;
pub mod journal;
pub mod ledger;

pub use entry::{LedgerEntry, Verdict};
pub use journal::Journal;
pub use ledger::{LedgerError, ResultLedger};
