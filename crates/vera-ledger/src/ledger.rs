// RESULT LEDGER
// Append-only record of completed operations, keyed by operation id.
//
// SAFETY INVARIANTS:
// 1. An entry exists only for operations that reached a terminal verdict
// 2. One writer wins per operation id; the loser gets a conflict
// 3. No mutation or deletion; history is permanent for the process
//    lifetime
// 4. Writes for distinct operation ids need no coordination

use std::path::Path;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::debug;
use thiserror::Error;

use crate::entry::LedgerEntry;
use crate::journal::Journal;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("operation `{operation_id}` already recorded")]
    OperationConflict { operation_id: String },

    #[error("operation `{operation_id}` not found")]
    NotFound { operation_id: String },

    #[error("journal write failed: {0}")]
    Journal(String),
}

#[derive(Default)]
pub struct ResultLedger {
    entries: DashMap<String, LedgerEntry>,
    journal: Option<Journal>,
}

impl ResultLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger that mirrors every recorded entry into a JSONL journal.
    pub fn with_journal(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let journal = Journal::open(path).map_err(|e| LedgerError::Journal(e.to_string()))?;
        Ok(ResultLedger {
            entries: DashMap::new(),
            journal: Some(journal),
        })
    }

    /// Record a terminal entry. Fails with a conflict if the operation id
    /// is already present; the existing entry is left untouched.
    pub fn record(&self, entry: LedgerEntry) -> Result<(), LedgerError> {
        match self.entries.entry(entry.operation_id.clone()) {
            Entry::Occupied(_) => Err(LedgerError::OperationConflict {
                operation_id: entry.operation_id,
            }),
            Entry::Vacant(slot) => {
                if let Some(journal) = &self.journal {
                    journal
                        .append(&entry)
                        .map_err(|e| LedgerError::Journal(e.to_string()))?;
                }
                debug!(
                    "ledger recorded operation `{}` ({} attempts)",
                    entry.operation_id,
                    entry.attempts.len()
                );
                slot.insert(entry);
                Ok(())
            }
        }
    }

    pub fn lookup(&self, operation_id: &str) -> Result<LedgerEntry, LedgerError> {
        self.entries
            .get(operation_id)
            .map(|entry| entry.clone())
            .ok_or_else(|| LedgerError::NotFound {
                operation_id: operation_id.to_string(),
            })
    }

    pub fn contains(&self, operation_id: &str) -> bool {
        self.entries.contains_key(operation_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vera_core::PolicyKind;

    fn accepted(id: &str) -> LedgerEntry {
        LedgerEntry::accepted(id, json!(42), PolicyKind::Strict, 3, vec![])
    }

    #[test]
    fn test_record_then_lookup() {
        let ledger = ResultLedger::new();
        ledger.record(accepted("op-1")).unwrap();
        let entry = ledger.lookup("op-1").unwrap();
        assert!(entry.is_accepted());
        assert_eq!(entry.operation_id, "op-1");
    }

    #[test]
    fn test_duplicate_id_conflicts_and_preserves_original() {
        let ledger = ResultLedger::new();
        ledger.record(accepted("op-1")).unwrap();

        let replacement = LedgerEntry::exhausted("op-1", 9, vec![]);
        let err = ledger.record(replacement).unwrap_err();
        assert!(matches!(err, LedgerError::OperationConflict { .. }));

        // Original entry untouched
        assert!(ledger.lookup("op-1").unwrap().is_accepted());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_lookup_is_idempotent() {
        let ledger = ResultLedger::new();
        ledger.record(accepted("op-1")).unwrap();

        let first = ledger.lookup("op-1").unwrap();
        let second = ledger.lookup("op-1").unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_missing_id_is_not_found() {
        let ledger = ResultLedger::new();
        assert!(matches!(
            ledger.lookup("absent"),
            Err(LedgerError::NotFound { .. })
        ));
    }

    #[test]
    fn test_distinct_ids_record_independently() {
        let ledger = ResultLedger::new();
        ledger.record(accepted("op-1")).unwrap();
        ledger.record(LedgerEntry::exhausted("op-2", 7, vec![])).unwrap();
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_journal_mirrors_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.jsonl");

        let ledger = ResultLedger::with_journal(&path).unwrap();
        ledger.record(accepted("op-1")).unwrap();
        ledger.record(accepted("op-2")).unwrap();

        let entries = Journal::read_entries(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].operation_id, "op-1");
    }
}
