//! HTTP Client
//!
//! One blocking reqwest client per process, configured from `VaultConfig`.
//! Every outbound request carries a timeout so a stalled provider ends in
//! the failure path instead of hanging a balance lookup forever.

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::config::VaultConfig;
use crate::error::{VaultError, VaultResult};
use crate::log_debug;

const USER_AGENT: &str = concat!("cryptovault/", env!("CARGO_PKG_VERSION"));

/// Build the shared client from configured timeouts
pub fn build_client(config: &VaultConfig) -> VaultResult<Client> {
    build_client_with(config.http_timeout, config.connect_timeout)
}

pub fn build_client_with(timeout: Duration, connect_timeout: Duration) -> VaultResult<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(connect_timeout)
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(5)
        .tcp_nodelay(true)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| VaultError::network_error(format!("Failed to create HTTP client: {}", e)))
}

/// GET `url` and decode a JSON body
pub fn get_json<T: DeserializeOwned>(client: &Client, url: &str) -> VaultResult<T> {
    log_debug!("http", "GET", url = url);

    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .map_err(|e| VaultError::from(e).with_details(format!("GET {}", extract_domain(url))))?;

    decode(response, url)
}

/// POST a JSON body to `url` and decode a JSON body
pub fn post_json<B: Serialize, T: DeserializeOwned>(
    client: &Client,
    url: &str,
    body: &B,
) -> VaultResult<T> {
    log_debug!("http", "POST", url = url);

    let response = client
        .post(url)
        .json(body)
        .send()
        .map_err(|e| VaultError::from(e).with_details(format!("POST {}", extract_domain(url))))?;

    decode(response, url)
}

fn decode<T: DeserializeOwned>(response: reqwest::blocking::Response, url: &str) -> VaultResult<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(VaultError::network_error(format!(
            "{} responded with HTTP {}",
            extract_domain(url),
            status.as_u16()
        )));
    }

    response
        .json::<T>()
        .map_err(|e| VaultError::parse_error(format!("Invalid JSON from {}: {}", extract_domain(url), e)))
}

/// Host part of a URL, used in messages so API keys in paths never leak
pub fn extract_domain(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "unknown-host".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_domain() {
        assert_eq!(
            extract_domain("https://solana-mainnet.g.alchemy.com/v2/KEY"),
            "solana-mainnet.g.alchemy.com"
        );
        assert_eq!(extract_domain("not a url"), "unknown-host");
    }

    #[test]
    fn test_build_client() {
        assert!(build_client_with(Duration::from_secs(5), Duration::from_secs(2)).is_ok());
    }
}
