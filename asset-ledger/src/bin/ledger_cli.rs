//! Ledger command-line host
//!
//! Opens the configured ledger, runs one operation and prints its payload.
//!
//! ```text
//! ledger-cli init_ledger
//! ledger-cli transfer CLIENT0 CLIENT1 A1 1000
//! ledger-cli list_transactions ALL
//! ```

use anyhow::Context;
use asset_ledger::{operation::OPERATIONS, Config, Ledger};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

/// Asset ledger: run one operation against the ledger store
#[derive(Parser, Debug)]
#[command(name = "ledger-cli")]
#[command(about = "Run one asset-ledger operation and print its result")]
struct Args {
    /// TOML config file (defaults to LEDGER_* environment variables)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the RocksDB data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Print Prometheus metrics to stderr after the operation
    #[arg(long)]
    metrics: bool,

    /// Operation name (use `help` to list operations)
    operation: String,

    /// Operation arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (stderr, so payloads on stdout stay clean)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.operation == "help" {
        for spec in OPERATIONS {
            println!("{:<24} {}", spec.name, spec.usage);
        }
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::from_env().context("loading config from environment")?,
    };
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }

    let ledger = Ledger::open(config).await.context("opening ledger")?;
    let result = ledger.invoke(&args.operation, args.args).await;

    if args.metrics {
        eprintln!("{}", ledger.metrics().encode()?);
    }
    ledger.shutdown().await?;

    let payload = result.with_context(|| format!("operation {} failed", args.operation))?;
    if !payload.is_empty() {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&payload)?;
        stdout.write_all(b"\n")?;
    }

    Ok(())
}
