use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

use quantumcoin_wallet::{
    count_addresses, load_csv, setup_database, upsert_balances,
    BalanceViewer, Config, FetchStatus, HttpBalanceClient,
};

#[derive(Parser, Debug)]
#[command(name = "quantumcoin-wallet", version, about = "QuantumCoin Wallet")]
struct Cli {
    /// Node API base URL (overrides QC_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Ledger database path (overrides QC_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive balance viewer (default)
    Ui,
    /// Look up one address and print its balance
    Balance { address: String },
    /// Load `address,balance` rows from a CSV file into the ledger
    Import { csv: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(db) = cli.db {
        config.db_path = db.to_string_lossy().into_owned();
    }

    match cli.command.unwrap_or(Command::Ui) {
        Command::Ui => run_ui_mode(&config),
        Command::Balance { address } => run_balance(&config, address),
        Command::Import { csv } => run_import(&config, &csv),
    }
}

fn init_logging(default_filter: &str) {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(default_filter));
}

fn run_balance(config: &Config, address: String) -> Result<()> {
    init_logging("warn");

    let client = HttpBalanceClient::new(config)?;
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    let mut viewer = BalanceViewer::new();
    viewer.set_address(address);
    runtime.block_on(viewer.fetch(&client));

    if let FetchStatus::Failed(msg) = viewer.status() {
        anyhow::bail!("Balance lookup against {} failed: {}", client.base_url(), msg);
    }

    match viewer.balance_text() {
        Some(balance) => println!("Balance: {}", balance),
        None => anyhow::bail!("No balance returned"),
    }

    Ok(())
}

fn run_import(config: &Config, csv_path: &Path) -> Result<()> {
    init_logging("info");

    println!("🗄️  Balance Import - CSV → SQLite + WAL");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Load CSV
    println!("\n📂 Loading CSV...");
    let records = load_csv(csv_path)?;
    println!("✓ Loaded {} balances from {}", records.len(), csv_path.display());

    // 2. Setup database
    println!("\n🔧 Setting up database...");
    let mut conn = Connection::open(&config.db_path)
        .with_context(|| format!("Failed to open ledger at {}", config.db_path))?;
    setup_database(&conn)?;
    println!("✓ Ledger initialized at {}", config.db_path);

    // 3. Upsert balances
    println!("\n💾 Writing balances...");
    let written = upsert_balances(&mut conn, &records)?;
    log::info!("upserted {} balance rows", written);

    // 4. Verify count
    let count = count_addresses(&conn)?;
    println!("✓ Ledger now holds {} addresses", count);

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &Config) -> Result<()> {
    use quantumcoin_wallet::ui;

    // stderr logging would draw over the alternate screen, so only on request
    if std::env::var_os("RUST_LOG").is_some() {
        env_logger::init();
    }

    let client = HttpBalanceClient::new(config)?;
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    println!("🖥️  Starting QuantumCoin Wallet against {}", client.base_url());

    let mut app = ui::App::new();
    ui::run_ui(&mut app, client, runtime.handle().clone())?;

    println!("\n✅ Wallet closed");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &Config) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or look up one address: quantumcoin-wallet balance <ADDRESS>");
    std::process::exit(1);
}
