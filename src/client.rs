use crate::balance::{balance_url, error_message, parse_balance, Amount};
use crate::config::Config;
use crate::error::{Result, WalletError};
use reqwest::Client;
use std::future::Future;

/// Anything that can answer "what is the balance of this address".
///
/// The viewer is generic over this so tests can swap in canned answers.
pub trait BalanceSource {
    fn fetch_balance(&self, address: &str) -> impl Future<Output = Result<Amount>> + Send;
}

/// Looks balances up over HTTP against a QuantumCoin node API.
#[derive(Debug, Clone)]
pub struct HttpBalanceClient {
    client: Client,
    base_url: String,
}

impl HttpBalanceClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl BalanceSource for HttpBalanceClient {
    async fn fetch_balance(&self, address: &str) -> Result<Amount> {
        let url = balance_url(&self.base_url, address);
        log::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            log::warn!("balance lookup for {:?} failed with {}", address, status);
            return Err(WalletError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        parse_balance(&body)
    }
}
