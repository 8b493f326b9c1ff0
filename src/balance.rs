// Wire contract of the balance lookup endpoint
//
// GET /api/address/balance?addr=<url-encoded address>  ->  { "balance": number }

use crate::error::{Result, WalletError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const BALANCE_PATH: &str = "/api/address/balance";
pub const ADDRESS_PARAM: &str = "addr";

/// Body written by the server for a successful lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub address: String,
    pub balance: i64,
}

/// Body written by the server for any failed request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
        }
    }
}

/// Full lookup URL for `address` against `base_url`.
pub fn balance_url(base_url: &str, address: &str) -> String {
    format!(
        "{}{}?{}={}",
        base_url.trim_end_matches('/'),
        BALANCE_PATH,
        ADDRESS_PARAM,
        urlencoding::encode(address)
    )
}

/// A balance as reported by the endpoint.
///
/// Integers stay exact past 2^53; anything else falls back to `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Amount {
    Coins(i64),
    Fractional(f64),
}

impl Amount {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Amount::Coins(n) => n as f64,
            Amount::Fractional(x) => x,
        }
    }
}

impl From<i64> for Amount {
    fn from(n: i64) -> Self {
        Amount::Coins(n)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Amount::Coins(n) => write!(f, "{}", n),
            Amount::Fractional(x) if x.fract() == 0.0 && x.abs() < 1e15 => write!(f, "{}", x as i64),
            Amount::Fractional(x) => write!(f, "{}", x),
        }
    }
}

/// Extract the numeric `balance` field from a response body.
///
/// Only `balance` is required; any other fields are ignored.
pub fn parse_balance(body: &[u8]) -> Result<Amount> {
    let json: Value = serde_json::from_slice(body)?;

    match json.get("balance") {
        None | Some(Value::Null) => Err(WalletError::MissingBalance),
        Some(value) => {
            if let Some(n) = value.as_i64() {
                Ok(Amount::Coins(n))
            } else {
                value
                    .as_f64()
                    .map(Amount::Fractional)
                    .ok_or_else(|| WalletError::InvalidBalance(value.to_string()))
            }
        }
    }
}

/// Best-effort message from an error body; falls back to the raw text.
pub fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<ErrorResponse>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| String::from_utf8_lossy(body).trim().to_string())
}
