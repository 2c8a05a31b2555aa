use mango_core::TraceConfig;
use mango_core::config::LedgerConfig;
use mangotrace_ledger::RedbLedger;
use mangotrace_lifecycle::{Invocation, MangoContract, Response};
use tracing::debug;

pub fn invoke(config: &TraceConfig, function: &str, args: &[String]) -> anyhow::Result<()> {
    match run(config, function, args)? {
        Response::Empty => println!("✓ {function} committed"),
        response => println!("{}", serde_json::to_string_pretty(&response)?),
    }
    Ok(())
}

/// Parse and execute one entry point against the configured ledger.
pub fn run(config: &TraceConfig, function: &str, args: &[String]) -> anyhow::Result<Response> {
    let invocation = Invocation::parse(function, args)?;
    let contract = MangoContract::new(open_ledger(&config.ledger)?, config);
    debug!(function = invocation.name(), "invoking");
    Ok(contract.invoke(invocation)?)
}

fn open_ledger(config: &LedgerConfig) -> anyhow::Result<RedbLedger> {
    if config.in_memory {
        return Ok(RedbLedger::open_in_memory()?);
    }
    if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(RedbLedger::open(&config.path)?)
}
