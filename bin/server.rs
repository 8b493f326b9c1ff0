// QuantumCoin Wallet - Web Server
// Serves the balance lookup API and the wallet page from the local ledger

use anyhow::{Context, Result};
use quantumcoin_wallet::api::{router, AppState};
use quantumcoin_wallet::{count_addresses, setup_database, Config, VERSION};
use rusqlite::Connection;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    log::info!("quantumcoin-server v{}", VERSION);

    let config = Config::from_env()?;

    let conn = Connection::open(&config.db_path)
        .with_context(|| format!("Failed to open ledger at {}", config.db_path))?;
    setup_database(&conn)?;
    log::info!("Ledger: {} ({} addresses)", config.db_path, count_addresses(&conn)?);

    let app = router(AppState::new(conn, config.http_port.clone()));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    log::info!("HTTP API started at http://localhost{}", config.http_port);
    log::info!("Wallet page: http://localhost{}/", config.http_port);

    axum::serve(listener, app)
        .await
        .context("Server stopped unexpectedly")?;

    Ok(())
}
