use std::path::Path;

use mango_core::TraceConfig;
use mango_core::config::CONFIG_FILE;

pub fn init(dir: &Path) -> anyhow::Result<()> {
    let output = dir.join(CONFIG_FILE);
    if output.exists() {
        anyhow::bail!("{} already exists", output.display());
    }
    std::fs::create_dir_all(dir)?;
    let config = TraceConfig::scaffold(dir);
    std::fs::write(&output, config.to_toml_string()?)?;
    println!("✓ Generated {}", output.display());
    Ok(())
}
