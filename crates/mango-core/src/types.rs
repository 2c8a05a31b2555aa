//! Shared types used across mangotrace crates.
//!
//! An [`AssetRecord`] is stored as a flat JSON object of string values.
//! The field names below are the ledger's wire schema; older records
//! written under the legacy names (`Producer Location`, `Fertilizers Used`,
//! `Freshness Level`, `Stage`) still decode, and are re-written in this
//! schema on their next update.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a batch of goods.
pub type BatchId = String;

/// Placeholder for location and custody fields that have not been set yet.
pub const UNSET: &str = "N/A";

/// Freshness assigned by `initMango` when none is configured.
pub const DEFAULT_FRESHNESS: &str = "Good";

/// First key of the asset key range (inclusive).
pub const ASSET_KEY_START: &str = "";

/// End of the asset key range (exclusive). Every valid batch id sorts below it.
pub const ASSET_KEY_END: &str = "\u{7f}";

/// Batch ids are non-empty printable ASCII without whitespace, which keeps
/// them inside `[ASSET_KEY_START, ASSET_KEY_END)`.
pub fn is_valid_batch_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_graphic())
}

// ── Status ────────────────────────────────────────────────────────

/// Lifecycle status of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetStatus {
    #[default]
    Start,
    Ordered,
    Shipped,
    Issued,
    Error,
}

impl AssetStatus {
    pub const ALL: [AssetStatus; 5] = [
        AssetStatus::Start,
        AssetStatus::Ordered,
        AssetStatus::Shipped,
        AssetStatus::Issued,
        AssetStatus::Error,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AssetStatus::Start => "START",
            AssetStatus::Ordered => "ORDERED",
            AssetStatus::Shipped => "SHIPPED",
            AssetStatus::Issued => "ISSUED",
            AssetStatus::Error => "ERROR",
        }
    }

    /// ISSUED and ERROR accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AssetStatus::Issued | AssetStatus::Error)
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Parties ───────────────────────────────────────────────────────

/// A party that can hold custody of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Party {
    Farmer,
    Exporter,
    Country1,
}

impl Party {
    pub fn as_str(&self) -> &'static str {
        match self {
            Party::Farmer => "FARMER",
            Party::Exporter => "EXPORTER",
            Party::Country1 => "COUNTRY1",
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Asset record ──────────────────────────────────────────────────

/// The persisted attribute set of one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Legacy records carry no id; the repository fills it from the key.
    #[serde(rename = "ID", default)]
    pub batch_id: BatchId,
    #[serde(rename = "Variety")]
    pub variety: String,
    /// Originating location.
    #[serde(rename = "Origin", alias = "Producer Location")]
    pub origin: String,
    #[serde(
        rename = "Fertiliser",
        alias = "Fertilizers Used",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub fertilizer: Option<String>,
    #[serde(rename = "Freshness", alias = "Freshness Level", default = "default_freshness")]
    pub freshness: String,
    #[serde(rename = "Status", alias = "Stage", default)]
    pub status: AssetStatus,
    /// Current location, updated on every transition.
    #[serde(rename = "Location", default = "unset")]
    pub location: String,
    #[serde(rename = "From", default = "unset")]
    pub custody_from: String,
    #[serde(rename = "To", default = "unset")]
    pub custody_to: String,
    /// Note attached to the most recent transition.
    #[serde(rename = "Comment", default)]
    pub comment: String,
}

fn unset() -> String {
    UNSET.to_string()
}

fn default_freshness() -> String {
    DEFAULT_FRESHNESS.to_string()
}

impl AssetRecord {
    /// Build a freshly created record in the START state.
    pub fn new(
        batch_id: &str,
        variety: &str,
        origin: &str,
        fertilizer: Option<&str>,
        freshness: &str,
    ) -> Self {
        Self {
            batch_id: batch_id.to_string(),
            variety: variety.to_string(),
            origin: origin.to_string(),
            fertilizer: fertilizer.map(str::to_string),
            freshness: freshness.to_string(),
            status: AssetStatus::Start,
            location: unset(),
            custody_from: unset(),
            custody_to: unset(),
            comment: String::new(),
        }
    }

    /// Encode into the ledger's wire format.
    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Decode from the ledger's wire format (current or legacy schema).
    pub fn decode(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

/// One entry of a range query: the ledger key and its decoded record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Record")]
    pub record: AssetRecord,
}
