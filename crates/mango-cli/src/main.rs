use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "mangotrace",
    about = "mangotrace: farm-to-port custody tracking for mango batches",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Config file (default: ./mangotrace.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one ledger entry point and print its payload.
    ///
    /// FUNCTION is one of: InitLedger, AddMango, QueryMango, QueryAllMango,
    /// ChangeMangoFreshLevel, initMango, Order, Ship, Issue, Query.
    /// Arguments are positional, e.g. `mangotrace invoke Order B1 ok Warehouse1`.
    Invoke {
        function: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Write a mangotrace.toml scaffold
    InitConfig {
        /// Directory for the config file and ledger
        #[arg(short, long, default_value = ".")]
        path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log.filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Invoke { function, args } => {
            commands::invoke::invoke(&config, &function, &args)
        }
        Commands::InitConfig { path } => commands::config::init(&path),
    }
}
