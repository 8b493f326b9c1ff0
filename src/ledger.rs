use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One address and its balance in whole coin units
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BalanceRecord {
    pub address: String,
    pub balance: i64,
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // WAL keeps readers unblocked while an import runs
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS balances (
            address TEXT PRIMARY KEY NOT NULL,
            balance INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// Read `address,balance` rows from a CSV file with a header line.
pub fn load_csv(csv_path: &Path) -> Result<Vec<BalanceRecord>> {
    let mut rdr = csv::Reader::from_path(csv_path).context("Failed to open CSV file")?;

    let mut records = Vec::new();
    for (i, result) in rdr.deserialize().enumerate() {
        let mut record: BalanceRecord =
            result.with_context(|| format!("Failed to deserialize balance row {}", i + 1))?;

        record.address = record.address.trim().to_string();
        if record.address.is_empty() {
            anyhow::bail!("Row {} has an empty address", i + 1);
        }

        records.push(record);
    }

    Ok(records)
}

/// Insert or replace balances in one transaction. Returns rows written.
pub fn upsert_balances(conn: &mut Connection, records: &[BalanceRecord]) -> Result<usize> {
    let now = Utc::now().to_rfc3339();
    let tx = conn.transaction()?;

    let mut written = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO balances (address, balance, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(address) DO UPDATE SET balance = excluded.balance, updated_at = excluded.updated_at",
        )?;

        for record in records {
            written += stmt.execute(params![record.address, record.balance, now])?;
        }
    }

    tx.commit()?;
    Ok(written)
}

/// Balance of `address`; unknown addresses hold nothing.
pub fn get_balance(conn: &Connection, address: &str) -> Result<i64> {
    let balance: Option<i64> = conn
        .query_row(
            "SELECT balance FROM balances WHERE address = ?1",
            params![address],
            |row| row.get(0),
        )
        .optional()?;

    Ok(balance.unwrap_or(0))
}

pub fn count_addresses(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM balances", [], |row| row.get(0))?;

    Ok(count)
}
