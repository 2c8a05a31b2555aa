//! A ledger that fails on demand, wrapping an in-memory [`RedbLedger`].

use mangotrace_ledger::{LedgerError, LedgerResult, LedgerStore, LedgerTxn, RedbLedger, RedbTxn};

pub struct FailingLedger {
    inner: RedbLedger,
    fail_begin: bool,
    fail_reads: bool,
    fail_put_at: Option<usize>,
}

impl FailingLedger {
    pub const BEGIN_FAILURE: &'static str = "write lock poisoned";
    pub const READ_FAILURE: &'static str = "disk offline";
    pub const WRITE_FAILURE: &'static str = "disk full";

    pub fn new() -> Self {
        Self {
            inner: RedbLedger::open_in_memory().unwrap(),
            fail_begin: false,
            fail_reads: false,
            fail_put_at: None,
        }
    }

    /// Every `begin` fails.
    pub fn failing_begin(mut self) -> Self {
        self.fail_begin = true;
        self
    }

    /// Committed reads (`get`, `range_scan`) fail.
    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    /// The `n`th put of each transaction (zero-based) fails.
    pub fn failing_put_at(mut self, n: usize) -> Self {
        self.fail_put_at = Some(n);
        self
    }

    pub fn inner(&self) -> &RedbLedger {
        &self.inner
    }
}

impl LedgerStore for FailingLedger {
    type Txn = FailingTxn;

    fn get(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        if self.fail_reads {
            return Err(LedgerError::Read(Self::READ_FAILURE.to_string()));
        }
        self.inner.get(key)
    }

    fn range_scan(
        &self,
        start: &str,
        end: &str,
        limit: usize,
    ) -> LedgerResult<Vec<(String, Vec<u8>)>> {
        if self.fail_reads {
            return Err(LedgerError::Read(Self::READ_FAILURE.to_string()));
        }
        self.inner.range_scan(start, end, limit)
    }

    fn begin(&self) -> LedgerResult<FailingTxn> {
        if self.fail_begin {
            return Err(LedgerError::Transaction(Self::BEGIN_FAILURE.to_string()));
        }
        Ok(FailingTxn {
            inner: self.inner.begin()?,
            puts: 0,
            fail_put_at: self.fail_put_at,
        })
    }
}

pub struct FailingTxn {
    inner: RedbTxn,
    puts: usize,
    fail_put_at: Option<usize>,
}

impl LedgerTxn for FailingTxn {
    fn get(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn put(&mut self, key: &str, value: &[u8]) -> LedgerResult<()> {
        if self.fail_put_at == Some(self.puts) {
            return Err(LedgerError::Write(FailingLedger::WRITE_FAILURE.to_string()));
        }
        self.puts += 1;
        self.inner.put(key, value)
    }

    fn commit(self) -> LedgerResult<()> {
        self.inner.commit()
    }

    fn abort(self) -> LedgerResult<()> {
        self.inner.abort()
    }
}
