//! mangotrace-lifecycle: custody tracking for mango batches.
//!
//! Batches move Farmer → Exporter → destination country. Every operation
//! runs inside a single ledger transaction supplied by a
//! [`LedgerStore`](mangotrace_ledger::LedgerStore).
//!
//! # Components
//!
//! - **`repository`**: batch id ↔ [`AssetRecord`](mango_core::AssetRecord) mapping, range scans
//! - **`engine`**: the lifecycle state machine (Order, Ship, Issue)
//! - **`query`**: point reads, full listings, freshness updates
//! - **`contract`**: named entry points with positional string arguments

pub mod contract;
pub mod engine;
pub mod error;
pub mod query;
pub mod repository;

#[cfg(test)]
mod testing;

pub use contract::{Invocation, MangoContract, Response};
pub use engine::{Action, LifecycleEngine, TransitionRule};
pub use error::{TraceError, TraceResult};
pub use query::QueryService;
pub use repository::{AssetScan, Repository};
