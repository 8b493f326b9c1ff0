// Balance Viewer: the address being edited and the last fetched balance

use crate::balance::Amount;
use crate::client::BalanceSource;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum FetchStatus {
    Idle,
    Loading,
    Failed(String),
}

/// Handle for one in-flight lookup, returned by [`BalanceViewer::begin_fetch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub id: u64,
    pub address: String,
}

#[derive(Debug, Clone)]
pub struct BalanceViewer {
    address: String,
    balance: Option<Amount>,
    status: FetchStatus,
    next_request_id: u64,
    latest_request_id: Option<u64>,
}

impl Default for BalanceViewer {
    fn default() -> Self {
        Self::new()
    }
}

impl BalanceViewer {
    pub fn new() -> Self {
        Self {
            address: String::new(),
            balance: None,
            status: FetchStatus::Idle,
            next_request_id: 1,
            latest_request_id: None,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn balance(&self) -> Option<Amount> {
        self.balance
    }

    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Loading
    }

    pub fn set_address(&mut self, address: impl Into<String>) {
        self.address = address.into();
    }

    pub fn push_char(&mut self, c: char) {
        self.address.push(c);
    }

    pub fn pop_char(&mut self) {
        self.address.pop();
    }

    /// Start a lookup for the current address.
    ///
    /// Every call supersedes the previous ticket: only the newest ticket's
    /// result is applied by [`complete_fetch`](Self::complete_fetch).
    pub fn begin_fetch(&mut self) -> FetchTicket {
        let id = self.next_request_id;
        self.next_request_id += 1;
        self.latest_request_id = Some(id);
        self.status = FetchStatus::Loading;

        FetchTicket {
            id,
            address: self.address.clone(),
        }
    }

    /// Apply a lookup result. Returns `false` for superseded tickets.
    ///
    /// On error the previous balance stays on screen.
    pub fn complete_fetch(&mut self, id: u64, result: Result<Amount>) -> bool {
        if self.latest_request_id != Some(id) {
            log::debug!("dropping stale balance response #{}", id);
            return false;
        }

        match result {
            Ok(balance) => {
                self.balance = Some(balance);
                self.status = FetchStatus::Idle;
            }
            Err(e) => {
                log::warn!("balance lookup #{} failed: {}", id, e);
                self.status = FetchStatus::Failed(e.to_string());
            }
        }
        true
    }

    /// Look up the current address and apply the answer.
    pub async fn fetch<S: BalanceSource>(&mut self, source: &S) -> Option<Amount> {
        let ticket = self.begin_fetch();
        let result = source.fetch_balance(&ticket.address).await;
        self.complete_fetch(ticket.id, result);
        self.balance
    }

    pub fn balance_text(&self) -> Option<String> {
        self.balance.map(|b| b.to_string())
    }
}
