// QuantumCoin Wallet - Core Library
// Shared by the terminal wallet, the one-shot CLI, and the API server

pub mod balance;
pub mod client;
pub mod config;
pub mod error;
pub mod ledger;
pub mod viewer;

#[cfg(feature = "server")]
pub mod api;

#[cfg(feature = "tui")]
pub mod ui;

// Re-export commonly used types
pub use balance::{
    balance_url, parse_balance,
    Amount, BalanceResponse, ErrorResponse, BALANCE_PATH,
};
pub use client::{BalanceSource, HttpBalanceClient};
pub use config::Config;
pub use error::{Result, WalletError};
pub use ledger::{
    BalanceRecord,
    count_addresses, get_balance, load_csv, setup_database, upsert_balances,
};
pub use viewer::{BalanceViewer, FetchStatus, FetchTicket};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
