// Runtime configuration, read from QC_* environment variables

use crate::error::{Result, WalletError};
use std::env;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8081";
pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
pub const DEFAULT_HTTP_PORT: &str = ":8081";
pub const DEFAULT_DB_PATH: &str = "quantumcoin.db";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL the client sends balance lookups to
    pub api_url: String,
    pub http_host: String,
    /// Always stored with a leading colon, e.g. ":8081"
    pub http_port: String,
    pub db_path: String,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            http_host: DEFAULT_HTTP_HOST.to_string(),
            http_port: DEFAULT_HTTP_PORT.to_string(),
            db_path: DEFAULT_DB_PATH.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. Unset or empty keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let request_timeout = match get("QC_REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    WalletError::Config(format!("QC_REQUEST_TIMEOUT_SECS must be an integer, got {:?}", raw))
                })?;
                if secs == 0 {
                    return Err(WalletError::Config(
                        "QC_REQUEST_TIMEOUT_SECS must be greater than zero".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => defaults.request_timeout,
        };

        Ok(Self {
            api_url: get("QC_API_URL").unwrap_or(defaults.api_url),
            http_host: get("QC_HTTP_HOST").unwrap_or(defaults.http_host),
            http_port: normalize_port(&get("QC_HTTP_PORT").unwrap_or(defaults.http_port)),
            db_path: get("QC_DB_PATH").unwrap_or(defaults.db_path),
            request_timeout,
        })
    }

    /// Socket address the API server binds to, e.g. "0.0.0.0:8081"
    pub fn bind_addr(&self) -> String {
        format!("{}{}", self.http_host, self.http_port)
    }
}

/// Accepts "8081" or ":8081" and returns ":8081".
pub fn normalize_port(port: &str) -> String {
    let port = port.trim();
    if port.starts_with(':') {
        port.to_string()
    } else {
        format!(":{}", port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.bind_addr(), "0.0.0.0:8081");
    }

    #[test]
    fn test_overrides_from_lookup() {
        let config = Config::from_lookup(lookup_from(&[
            ("QC_API_URL", "http://node.local:9000"),
            ("QC_HTTP_PORT", "9000"),
            ("QC_DB_PATH", "/tmp/ledger.db"),
            ("QC_REQUEST_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "http://node.local:9000");
        assert_eq!(config.http_port, ":9000");
        assert_eq!(config.db_path, "/tmp/ledger.db");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_empty_value_keeps_default() {
        let config = Config::from_lookup(lookup_from(&[("QC_API_URL", "  ")])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_bad_timeout_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("QC_REQUEST_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, WalletError::Config(_)));

        let err = Config::from_lookup(lookup_from(&[("QC_REQUEST_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, WalletError::Config(_)));
    }

    #[test]
    fn test_normalize_port() {
        assert_eq!(normalize_port("8090"), ":8090");
        assert_eq!(normalize_port(":8090"), ":8090");
    }
}
