//! Query service: reads over the repository, plus freshness updates.

use mango_core::{ASSET_KEY_END, ASSET_KEY_START, AssetRecord, QueryResult};
use mangotrace_ledger::LedgerStore;
use tracing::{debug, info};

use crate::error::TraceResult;
use crate::repository::Repository;

/// Read-side operations plus the ungated freshness update.
pub struct QueryService<'a, L: LedgerStore> {
    repo: Repository<'a, L>,
}

impl<'a, L: LedgerStore> QueryService<'a, L> {
    pub fn new(repo: Repository<'a, L>) -> Self {
        Self { repo }
    }

    pub fn query_one(&self, batch_id: &str) -> TraceResult<AssetRecord> {
        self.repo.get(batch_id)
    }

    /// Every asset on the ledger, in key order.
    pub fn query_all(&self) -> TraceResult<Vec<QueryResult>> {
        let results = self
            .repo
            .scan(ASSET_KEY_START, ASSET_KEY_END)
            .map(|entry| entry.map(|(key, record)| QueryResult { key, record }))
            .collect::<TraceResult<Vec<_>>>()?;
        debug!(count = results.len(), "listed assets");
        Ok(results)
    }

    /// Replace the freshness level of a batch. Status and custody are not
    /// consulted or changed.
    pub fn update_freshness(&self, batch_id: &str, level: &str) -> TraceResult<AssetRecord> {
        let record = self.repo.update(batch_id, |record| {
            record.freshness = level.to_string();
            record.clone()
        })?;
        info!(batch_id = %batch_id, freshness = %level, "freshness updated");
        Ok(record)
    }
}
