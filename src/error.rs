use thiserror::Error;

/// Errors surfaced by balance lookups and configuration parsing.
#[derive(Debug, Error)]
pub enum WalletError {
    /// Transport failure: connect, timeout, or body read
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("response has no `balance` field")]
    MissingBalance,

    #[error("`balance` is not a number: {0}")]
    InvalidBalance(String),

    #[error("malformed JSON body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, WalletError>;
