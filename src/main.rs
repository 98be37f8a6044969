use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ordersync::io::store::{JsonStore, OrderStore};
use ordersync::sync;
use ordersync::{Result, SyncError};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init()
        .map_err(|error| SyncError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Sync(args) => execute_sync(args),
        Command::Orders(args) => list_orders(args),
    }
}

fn execute_sync(args: SyncArgs) -> Result<()> {
    if !args.input.exists() {
        return Err(SyncError::MissingInput(args.input));
    }

    let summary = sync::sync_from_workbook(&args.input, &args.sheet, &args.store)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn list_orders(args: OrdersArgs) -> Result<()> {
    let store = JsonStore::open(&args.store)?;
    let orders = store.list()?;
    println!("{}", serde_json::to_string_pretty(&orders)?);
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Reconcile spreadsheet work-order exports into the order store."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest a worksheet and reconcile every work order it contains.
    Sync(SyncArgs),
    /// Print the stored orders as JSON (debugging aid).
    Orders(OrdersArgs),
}

#[derive(clap::Args)]
struct SyncArgs {
    /// Source workbook path.
    #[arg(long)]
    input: PathBuf,

    /// Worksheet holding the work-order export.
    #[arg(long, default_value = "Work Orders")]
    sheet: String,

    /// Directory backing the JSON store.
    #[arg(long)]
    store: PathBuf,
}

#[derive(clap::Args)]
struct OrdersArgs {
    /// Directory backing the JSON store.
    #[arg(long)]
    store: PathBuf,
}
