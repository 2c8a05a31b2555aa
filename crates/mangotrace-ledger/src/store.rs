//! LedgerStore: the storage capability asset operations run against,
//! and its redb implementation.
//!
//! Values are opaque bytes; encoding is the caller's concern. The store
//! supports both on-disk and in-memory backends (the latter for testing
//! and one-shot invocations).

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, WriteTransaction};
use tracing::{debug, warn};

use crate::error::{LedgerError, LedgerResult};
use crate::tables::ASSETS;

/// Convert any `Display` error into a `LedgerError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| LedgerError::$variant(e.to_string())
    };
}

/// Reads and writes staged inside one ledger transaction.
pub trait LedgerTxn {
    /// Get the value for a key, including puts staged earlier in this transaction.
    fn get(&self, key: &str) -> LedgerResult<Option<Vec<u8>>>;

    /// Stage a write. Nothing is visible outside the transaction until commit.
    fn put(&mut self, key: &str, value: &[u8]) -> LedgerResult<()>;

    /// Make every staged put durable and visible at once.
    fn commit(self) -> LedgerResult<()>;

    /// Discard every staged put.
    fn abort(self) -> LedgerResult<()>;
}

/// A transactional key-value ledger with ordered keys.
///
/// There is no delete: ledger entries form an audit trail.
pub trait LedgerStore: Send + Sync {
    type Txn: LedgerTxn;

    /// Get the committed value for a key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> LedgerResult<Option<Vec<u8>>>;

    /// Up to `limit` committed entries with keys in `[start, end)`, in ascending key order.
    fn range_scan(
        &self,
        start: &str,
        end: &str,
        limit: usize,
    ) -> LedgerResult<Vec<(String, Vec<u8>)>>;

    /// Open a write transaction.
    fn begin(&self) -> LedgerResult<Self::Txn>;

    /// Run `op` inside one write transaction.
    ///
    /// If `op` returns `Ok` its puts are committed atomically; if it
    /// returns `Err` the transaction is aborted and nothing is written.
    fn transact<T, E, F>(&self, op: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self::Txn) -> Result<T, E>,
        E: From<LedgerError>,
    {
        let mut txn = self.begin()?;
        match op(&mut txn) {
            Ok(out) => {
                txn.commit()?;
                Ok(out)
            }
            Err(e) => {
                if let Err(abort_err) = txn.abort() {
                    warn!(error = %abort_err, "ledger transaction abort failed");
                }
                Err(e)
            }
        }
    }
}

/// Thread-safe ledger backed by redb.
#[derive(Clone)]
pub struct RedbLedger {
    db: Arc<Database>,
}

impl RedbLedger {
    /// Open (or create) a persistent ledger at the given path.
    pub fn open(path: &Path) -> LedgerResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let ledger = Self { db: Arc::new(db) };
        ledger.ensure_tables()?;
        debug!(?path, "ledger opened");
        Ok(ledger)
    }

    /// Create an ephemeral in-memory ledger.
    pub fn open_in_memory() -> LedgerResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let ledger = Self { db: Arc::new(db) };
        ledger.ensure_tables()?;
        debug!("in-memory ledger opened");
        Ok(ledger)
    }

    /// Create the asset table if it doesn't exist yet.
    fn ensure_tables(&self) -> LedgerResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(ASSETS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Commit))?;
        Ok(())
    }
}

impl LedgerStore for RedbLedger {
    type Txn = RedbTxn;

    fn get(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(ASSETS).map_err(map_err!(Table))?;
        let value = table
            .get(key)
            .map_err(map_err!(Read))?
            .map(|guard| guard.value().to_vec());
        Ok(value)
    }

    fn range_scan(
        &self,
        start: &str,
        end: &str,
        limit: usize,
    ) -> LedgerResult<Vec<(String, Vec<u8>)>> {
        if limit == 0 || start >= end {
            return Ok(Vec::new());
        }
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(ASSETS).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.range(start..end).map_err(map_err!(Read))?.take(limit) {
            let (key, value) = entry.map_err(map_err!(Read))?;
            results.push((key.value().to_string(), value.value().to_vec()));
        }
        Ok(results)
    }

    fn begin(&self) -> LedgerResult<RedbTxn> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        Ok(RedbTxn { txn })
    }
}

/// A redb write transaction over the asset table.
pub struct RedbTxn {
    txn: WriteTransaction,
}

impl LedgerTxn for RedbTxn {
    fn get(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        let table = self.txn.open_table(ASSETS).map_err(map_err!(Table))?;
        let value = table
            .get(key)
            .map_err(map_err!(Read))?
            .map(|guard| guard.value().to_vec());
        Ok(value)
    }

    fn put(&mut self, key: &str, value: &[u8]) -> LedgerResult<()> {
        let mut table = self.txn.open_table(ASSETS).map_err(map_err!(Table))?;
        table.insert(key, value).map_err(map_err!(Write))?;
        debug!(%key, bytes = value.len(), "ledger put staged");
        Ok(())
    }

    fn commit(self) -> LedgerResult<()> {
        self.txn.commit().map_err(map_err!(Commit))
    }

    fn abort(self) -> LedgerResult<()> {
        self.txn.abort().map_err(map_err!(Transaction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put_one(ledger: &RedbLedger, key: &str, value: &[u8]) {
        ledger.transact(|txn| txn.put(key, value)).unwrap();
    }

    #[test]
    fn put_and_get() {
        let ledger = RedbLedger::open_in_memory().unwrap();
        put_one(&ledger, "B1", b"hello");

        assert_eq!(ledger.get("B1").unwrap(), Some(b"hello".to_vec()));
    }

    #[test]
    fn get_nonexistent_returns_none() {
        let ledger = RedbLedger::open_in_memory().unwrap();
        assert!(ledger.get("nope").unwrap().is_none());
    }

    #[test]
    fn put_overwrites() {
        let ledger = RedbLedger::open_in_memory().unwrap();
        put_one(&ledger, "B1", b"v1");
        put_one(&ledger, "B1", b"v2");

        assert_eq!(ledger.get("B1").unwrap(), Some(b"v2".to_vec()));
    }

    #[test]
    fn txn_reads_its_own_writes() {
        let ledger = RedbLedger::open_in_memory().unwrap();
        let seen = ledger
            .transact(|txn| {
                txn.put("B1", b"staged")?;
                txn.get("B1")
            })
            .unwrap();

        assert_eq!(seen, Some(b"staged".to_vec()));
    }

    #[test]
    fn failed_op_writes_nothing() {
        let ledger = RedbLedger::open_in_memory().unwrap();
        let result: LedgerResult<()> = ledger.transact(|txn| {
            txn.put("B1", b"first")?;
            txn.put("B2", b"second")?;
            Err(LedgerError::Write("simulated".to_string()))
        });

        assert!(result.is_err());
        assert!(ledger.get("B1").unwrap().is_none());
        assert!(ledger.get("B2").unwrap().is_none());
    }

    #[test]
    fn multi_put_commits_together() {
        let ledger = RedbLedger::open_in_memory().unwrap();
        ledger
            .transact(|txn| {
                txn.put("B1", b"1")?;
                txn.put("B2", b"2")
            })
            .unwrap();

        assert!(ledger.get("B1").unwrap().is_some());
        assert!(ledger.get("B2").unwrap().is_some());
    }

    #[test]
    fn range_scan_is_half_open_and_ordered() {
        let ledger = RedbLedger::open_in_memory().unwrap();
        for key in ["c", "a", "d", "b"] {
            put_one(&ledger, key, key.as_bytes());
        }

        let keys: Vec<String> = ledger
            .range_scan("a", "d", 10)
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn range_scan_respects_limit() {
        let ledger = RedbLedger::open_in_memory().unwrap();
        for i in 0..5 {
            put_one(&ledger, &format!("K{i}"), b"x");
        }

        let page = ledger.range_scan("K", "L", 2).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].0, "K0");
        assert_eq!(page[1].0, "K1");
    }

    #[test]
    fn range_scan_degenerate_ranges() {
        let ledger = RedbLedger::open_in_memory().unwrap();
        put_one(&ledger, "B1", b"x");

        assert!(ledger.range_scan("B1", "B1", 10).unwrap().is_empty());
        assert!(ledger.range_scan("Z", "A", 10).unwrap().is_empty());
        assert!(ledger.range_scan("", "\u{7f}", 0).unwrap().is_empty());
    }

    #[test]
    fn empty_ledger_scan() {
        let ledger = RedbLedger::open_in_memory().unwrap();
        assert!(ledger.range_scan("", "\u{7f}", 10).unwrap().is_empty());
    }

    #[test]
    fn persistence_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("ledger.redb");

        {
            let ledger = RedbLedger::open(&db_path).unwrap();
            put_one(&ledger, "B1", b"kept");
        }

        // Reopen the same database file.
        let ledger = RedbLedger::open(&db_path).unwrap();
        assert_eq!(ledger.get("B1").unwrap(), Some(b"kept".to_vec()));
    }
}
