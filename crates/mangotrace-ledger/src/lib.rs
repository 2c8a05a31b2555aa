//! mangotrace-ledger: the key-value ledger that asset records live in.
//!
//! Backed by [redb](https://docs.rs/redb). The [`LedgerStore`] trait is the
//! seam the lifecycle crate is written against: point reads, bounded range
//! scans, and write transactions whose puts commit together or not at all.
//!
//! [`RedbLedger`] is `Clone` + `Send` + `Sync` (backed by `Arc<Database>`).
//! redb admits one write transaction at a time, so concurrent
//! read-modify-write operations on the same key are serialized.

pub mod error;
pub mod store;
pub mod tables;

pub use error::{LedgerError, LedgerResult};
pub use store::{LedgerStore, LedgerTxn, RedbLedger, RedbTxn};
