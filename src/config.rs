//! Runtime Configuration
//!
//! Endpoints, provider keys and timeouts. Values come from the environment
//! first and are then overridden by command-line flags.

use std::time::Duration;
use url::Url;

use crate::error::{VaultError, VaultResult};
use crate::types::Network;

pub const ENV_ALCHEMY_API_KEY: &str = "CRYPTOVAULT_ALCHEMY_API_KEY";
pub const ENV_DEVNET_RPC_URL: &str = "CRYPTOVAULT_DEVNET_RPC_URL";
pub const ENV_MAINNET_RPC_URL: &str = "CRYPTOVAULT_MAINNET_RPC_URL";
pub const ENV_PRICE_API_URL: &str = "CRYPTOVAULT_PRICE_API_URL";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "CRYPTOVAULT_HTTP_TIMEOUT_SECS";

pub const COINGECKO_API_BASE: &str = "https://api.coingecko.com/api/v3";

/// Reference price used whenever the price provider fails
pub const FALLBACK_SOL_PRICE_USD: f64 = 150.0;

/// How long a fetched price stays current
pub const PRICE_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
pub struct VaultConfig {
    pub alchemy_api_key: Option<String>,
    pub devnet_rpc_url: Option<String>,
    pub mainnet_rpc_url: Option<String>,
    pub price_api_url: String,
    pub fallback_price_usd: f64,
    pub price_refresh: Duration,
    pub http_timeout: Duration,
    pub connect_timeout: Duration,
    pub network: Network,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            alchemy_api_key: None,
            devnet_rpc_url: None,
            mainnet_rpc_url: None,
            price_api_url: COINGECKO_API_BASE.to_string(),
            fallback_price_usd: FALLBACK_SOL_PRICE_USD,
            price_refresh: PRICE_REFRESH_INTERVAL,
            http_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            network: Network::default(),
        }
    }
}

impl VaultConfig {
    /// Load from process environment
    pub fn from_env() -> VaultResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> VaultResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        config.alchemy_api_key = get(ENV_ALCHEMY_API_KEY);
        config.devnet_rpc_url = get(ENV_DEVNET_RPC_URL);
        config.mainnet_rpc_url = get(ENV_MAINNET_RPC_URL);
        if let Some(url) = get(ENV_PRICE_API_URL) {
            config.price_api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = get(ENV_HTTP_TIMEOUT_SECS) {
            let secs: u64 = secs.parse().map_err(|_| {
                VaultError::config_error(format!("{} must be a whole number of seconds", ENV_HTTP_TIMEOUT_SECS))
            })?;
            if secs == 0 {
                return Err(VaultError::config_error(format!("{} must be positive", ENV_HTTP_TIMEOUT_SECS)));
            }
            config.http_timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Replace the RPC endpoint of one network
    pub fn set_rpc_override(&mut self, network: Network, url: impl Into<String>) {
        match network {
            Network::Devnet => self.devnet_rpc_url = Some(url.into()),
            Network::Mainnet => self.mainnet_rpc_url = Some(url.into()),
        }
    }

    /// Endpoint a `getBalance` for `network` is sent to.
    ///
    /// Explicit override, then Alchemy with the configured key, then the
    /// public Solana endpoint.
    pub fn rpc_url(&self, network: Network) -> String {
        let explicit = match network {
            Network::Devnet => self.devnet_rpc_url.as_ref(),
            Network::Mainnet => self.mainnet_rpc_url.as_ref(),
        };

        if let Some(url) = explicit {
            return url.clone();
        }
        if let Some(ref key) = self.alchemy_api_key {
            return format!("{}{}", network.alchemy_rpc_prefix(), key);
        }
        network.public_rpc_url().to_string()
    }

    /// Every endpoint must parse and use https, loopback hosts excepted
    pub fn validate(&self) -> VaultResult<()> {
        for network in [Network::Devnet, Network::Mainnet] {
            validate_endpoint(&self.rpc_url(network))?;
        }
        validate_endpoint(&self.price_api_url)?;

        if !(self.fallback_price_usd.is_finite() && self.fallback_price_usd > 0.0) {
            return Err(VaultError::config_error("Fallback price must be a positive number"));
        }
        Ok(())
    }
}

fn validate_endpoint(raw: &str) -> VaultResult<()> {
    let url = Url::parse(raw)?;

    match url.scheme() {
        "https" => Ok(()),
        "http" if is_loopback(&url) => Ok(()),
        scheme => Err(VaultError::config_error(format!(
            "Endpoint {} uses {}; https is required for remote hosts",
            url.host_str().unwrap_or("?"),
            scheme
        ))),
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(url::Host::Domain(domain)) => domain == "localhost",
        Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
        Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_use_public_endpoints() {
        let config = VaultConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.rpc_url(Network::Devnet), "https://api.devnet.solana.com");
        assert_eq!(config.rpc_url(Network::Mainnet), "https://api.mainnet-beta.solana.com");
        assert_eq!(config.fallback_price_usd, 150.0);
        assert_eq!(config.price_refresh, Duration::from_secs(300));
    }

    #[test]
    fn test_alchemy_key_selects_alchemy() {
        let config = VaultConfig::from_lookup(lookup(&[(ENV_ALCHEMY_API_KEY, "abc123")])).unwrap();
        assert_eq!(
            config.rpc_url(Network::Devnet),
            "https://solana-devnet.g.alchemy.com/v2/abc123"
        );
        assert_eq!(
            config.rpc_url(Network::Mainnet),
            "https://solana-mainnet.g.alchemy.com/v2/abc123"
        );
    }

    #[test]
    fn test_explicit_override_wins() {
        let mut config = VaultConfig::from_lookup(lookup(&[(ENV_ALCHEMY_API_KEY, "abc123")])).unwrap();
        config.set_rpc_override(Network::Devnet, "http://127.0.0.1:8899");
        assert_eq!(config.rpc_url(Network::Devnet), "http://127.0.0.1:8899");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_plain_http_remote() {
        let err = VaultConfig::from_lookup(lookup(&[(ENV_MAINNET_RPC_URL, "http://rpc.example.com")]))
            .unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ConfigError);
    }

    #[test]
    fn test_rejects_bad_timeout() {
        assert!(VaultConfig::from_lookup(lookup(&[(ENV_HTTP_TIMEOUT_SECS, "soon")])).is_err());
        assert!(VaultConfig::from_lookup(lookup(&[(ENV_HTTP_TIMEOUT_SECS, "0")])).is_err());

        let config = VaultConfig::from_lookup(lookup(&[(ENV_HTTP_TIMEOUT_SECS, "5")])).unwrap();
        assert_eq!(config.http_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = VaultConfig::from_lookup(lookup(&[(ENV_ALCHEMY_API_KEY, "  ")])).unwrap();
        assert!(config.alchemy_api_key.is_none());
    }
}
