use std::path::Path;

use anyhow::Context;
use mango_core::TraceConfig;
use mango_core::config::CONFIG_FILE;

pub mod config;
pub mod invoke;

/// Load `explicit`, else `./mangotrace.toml` if it exists, else defaults.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<TraceConfig> {
    let path = match explicit {
        Some(path) => path,
        None if Path::new(CONFIG_FILE).is_file() => Path::new(CONFIG_FILE),
        None => return Ok(TraceConfig::default()),
    };
    TraceConfig::from_file(path).with_context(|| format!("reading config {}", path.display()))
}
