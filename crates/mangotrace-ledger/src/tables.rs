//! redb table definitions for the ledger.

use redb::TableDefinition;

/// Asset records keyed by batch id. Values are JSON-encoded records.
pub const ASSETS: TableDefinition<&str, &[u8]> = TableDefinition::new("assets");
