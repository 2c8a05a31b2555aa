//! mangotrace.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::DEFAULT_FRESHNESS;

/// Default name of the configuration file.
pub const CONFIG_FILE: &str = "mangotrace.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    pub ledger: LedgerConfig,
    pub defaults: DefaultsConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// redb database file.
    pub path: PathBuf,
    /// Use a throwaway in-memory ledger instead of `path`.
    pub in_memory: bool,
    /// Entries fetched per page when scanning the asset range.
    pub scan_page_size: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("mangotrace.redb"),
            in_memory: false,
            scan_page_size: 64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Freshness assigned by `initMango`.
    pub freshness: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            freshness: DEFAULT_FRESHNESS.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl TraceConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TraceConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Scaffold a config that keeps the ledger under `data_dir`.
    pub fn scaffold(data_dir: &Path) -> Self {
        TraceConfig {
            ledger: LedgerConfig {
                path: data_dir.join("mangotrace.redb"),
                ..LedgerConfig::default()
            },
            defaults: DefaultsConfig::default(),
            log: LogConfig {
                filter: "info,mangotrace=debug".to_string(),
            },
        }
    }
}
