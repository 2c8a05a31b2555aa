//! Asset repository: maps batch ids to [`AssetRecord`]s in the ledger.
//!
//! Owns encoding, existence checks and range scans. Every write happens
//! inside one ledger transaction, so a failed operation leaves no partial
//! state behind.

use std::collections::VecDeque;

use mango_core::{AssetRecord, is_valid_batch_id};
use mangotrace_ledger::{LedgerStore, LedgerTxn};
use tracing::{debug, warn};

use crate::error::{TraceError, TraceResult};

/// Entries fetched from the ledger per scan page.
pub const DEFAULT_PAGE_SIZE: usize = 64;

/// Typed access to asset records stored in a [`LedgerStore`].
pub struct Repository<'a, L: LedgerStore> {
    ledger: &'a L,
    page_size: usize,
}

impl<'a, L: LedgerStore> Repository<'a, L> {
    pub fn new(ledger: &'a L) -> Self {
        Self {
            ledger,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Store a new record under its batch id.
    pub fn create(&self, record: &AssetRecord) -> TraceResult<()> {
        self.create_all(std::slice::from_ref(record))
    }

    /// Store several new records in one transaction. If any batch id is
    /// already taken, nothing is written.
    pub fn create_all(&self, records: &[AssetRecord]) -> TraceResult<()> {
        for record in records {
            validate_batch_id(&record.batch_id)?;
        }
        self.ledger.transact(|txn| -> TraceResult<()> {
            for record in records {
                if txn.get(&record.batch_id)?.is_some() {
                    return Err(TraceError::AlreadyExists {
                        batch_id: record.batch_id.clone(),
                    });
                }
                put(txn, &record.batch_id, record)?;
            }
            Ok(())
        })?;
        debug!(count = records.len(), "asset records created");
        Ok(())
    }

    /// Fetch the record for a batch.
    pub fn get(&self, batch_id: &str) -> TraceResult<AssetRecord> {
        let bytes = self
            .ledger
            .get(batch_id)?
            .ok_or_else(|| not_found(batch_id))?;
        decode(batch_id, &bytes)
    }

    /// Read-modify-write of one record inside a single ledger transaction.
    ///
    /// The record is written back whatever `f` returns; callers encode
    /// failure in `T`.
    pub(crate) fn update<T>(
        &self,
        batch_id: &str,
        f: impl FnOnce(&mut AssetRecord) -> T,
    ) -> TraceResult<T> {
        self.ledger.transact(|txn| -> TraceResult<T> {
            let mut record = load(txn, batch_id)?;
            let out = f(&mut record);
            put(txn, batch_id, &record)?;
            Ok(out)
        })
    }

    /// Lazily iterate the records with keys in `[start, end)`, in key order.
    pub fn scan(&self, start: &str, end: &str) -> AssetScan<'a, L> {
        AssetScan {
            ledger: self.ledger,
            start: start.to_string(),
            cursor: start.to_string(),
            end: end.to_string(),
            page_size: self.page_size,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }
}

/// Cursor over a key range, pulling one page from the ledger at a time.
///
/// Each page is read in its own read transaction. Cloning (or calling
/// [`rewind`](AssetScan::rewind)) restarts from the beginning of the range.
pub struct AssetScan<'a, L: LedgerStore> {
    ledger: &'a L,
    start: String,
    cursor: String,
    end: String,
    page_size: usize,
    buffer: VecDeque<(String, Vec<u8>)>,
    exhausted: bool,
}

impl<L: LedgerStore> AssetScan<'_, L> {
    pub fn rewind(&mut self) {
        self.cursor.clone_from(&self.start);
        self.buffer.clear();
        self.exhausted = false;
    }

    fn fill(&mut self) -> TraceResult<()> {
        let page = self
            .ledger
            .range_scan(&self.cursor, &self.end, self.page_size)?;
        if page.len() < self.page_size {
            self.exhausted = true;
        }
        if let Some((last, _)) = page.last() {
            self.cursor = successor(last);
        }
        self.buffer.extend(page);
        Ok(())
    }
}

impl<L: LedgerStore> Clone for AssetScan<'_, L> {
    fn clone(&self) -> Self {
        Self {
            ledger: self.ledger,
            start: self.start.clone(),
            cursor: self.start.clone(),
            end: self.end.clone(),
            page_size: self.page_size,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }
}

impl<L: LedgerStore> Iterator for AssetScan<'_, L> {
    type Item = TraceResult<(String, AssetRecord)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.fill() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
        let (key, bytes) = self.buffer.pop_front()?;
        Some(decode(&key, &bytes).map(|record| (key, record)))
    }
}

fn load<T: LedgerTxn>(txn: &T, batch_id: &str) -> TraceResult<AssetRecord> {
    let bytes = txn.get(batch_id)?.ok_or_else(|| not_found(batch_id))?;
    decode(batch_id, &bytes)
}

/// Unconditional overwrite of the record stored under `key`.
fn put<T: LedgerTxn>(txn: &mut T, key: &str, record: &AssetRecord) -> TraceResult<()> {
    let bytes = record.encode().map_err(|e| TraceError::Serialization {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    txn.put(key, &bytes)?;
    Ok(())
}

/// Decode the record stored under `key`. The ledger key is the batch id;
/// a stored `ID` that disagrees with it is replaced.
fn decode(key: &str, bytes: &[u8]) -> TraceResult<AssetRecord> {
    let mut record = AssetRecord::decode(bytes).map_err(|e| TraceError::Serialization {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    if record.batch_id != key {
        if !record.batch_id.is_empty() {
            warn!(key = %key, stored_id = %record.batch_id, "record id differs from ledger key");
        }
        record.batch_id = key.to_string();
    }
    Ok(record)
}

fn not_found(batch_id: &str) -> TraceError {
    TraceError::NotFound {
        batch_id: batch_id.to_string(),
    }
}

fn validate_batch_id(batch_id: &str) -> TraceResult<()> {
    if is_valid_batch_id(batch_id) {
        Ok(())
    } else {
        Err(TraceError::InvalidArgument(format!(
            "batch id {batch_id:?} must be non-empty printable ASCII without spaces"
        )))
    }
}

/// Smallest key that sorts strictly after `key`.
fn successor(key: &str) -> String {
    format!("{key}\0")
}
