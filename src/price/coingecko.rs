//! CoinGecko API client for the SOL reference price
//!
//! Endpoint used:
//! - /simple/price - Simple price lookup

use reqwest::blocking::Client;
use serde_json::Value;

use super::PriceProvider;
use crate::config::VaultConfig;
use crate::error::{VaultError, VaultResult};
use crate::utils;

/// CoinGecko token id for SOL
pub const SOLANA_TOKEN_ID: &str = "solana";

/// Quote currency
pub const USD: &str = "usd";

/// CoinGecko API client
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    /// API base URL
    pub base_url: String,
    client: Client,
}

impl CoinGeckoClient {
    pub fn new(config: &VaultConfig) -> VaultResult<Self> {
        Ok(Self::with_client(utils::build_client(config)?, &config.price_api_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Build simple price URL
    /// GET /simple/price?ids={ids}&vs_currencies={currencies}
    pub fn simple_price_url(&self, token_ids: &[&str], currencies: &[&str]) -> String {
        format!(
            "{}/simple/price?ids={}&vs_currencies={}",
            self.base_url,
            token_ids.join(","),
            currencies.join(",")
        )
    }
}

impl PriceProvider for CoinGeckoClient {
    fn sol_usd(&self) -> VaultResult<f64> {
        let url = self.simple_price_url(&[SOLANA_TOKEN_ID], &[USD]);
        let body: Value = utils::get_json(&self.client, &url)?;
        parse_simple_price(&body, SOLANA_TOKEN_ID, USD)
    }
}

/// Read `{token_id: {currency: price}}` from a simple price response
pub fn parse_simple_price(body: &Value, token_id: &str, currency: &str) -> VaultResult<f64> {
    let price = body
        .get(token_id)
        .and_then(|t| t.get(currency))
        .and_then(Value::as_f64)
        .ok_or_else(|| {
            VaultError::parse_error(format!("Missing {}.{} in price response", token_id, currency))
        })?;

    if !(price.is_finite() && price > 0.0) {
        return Err(VaultError::parse_error(format!("Implausible price {}", price)));
    }
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::COINGECKO_API_BASE;
    use serde_json::json;

    #[test]
    fn test_simple_price_url() {
        let client = CoinGeckoClient::with_client(Client::new(), COINGECKO_API_BASE);
        assert_eq!(
            client.simple_price_url(&[SOLANA_TOKEN_ID], &[USD]),
            "https://api.coingecko.com/api/v3/simple/price?ids=solana&vs_currencies=usd"
        );
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = CoinGeckoClient::with_client(Client::new(), "http://localhost:9000/api/");
        assert_eq!(
            client.simple_price_url(&["solana"], &["usd"]),
            "http://localhost:9000/api/simple/price?ids=solana&vs_currencies=usd"
        );
    }

    #[test]
    fn test_parse_simple_price() {
        let body = json!({ "solana": { "usd": 171.23 } });
        assert_eq!(parse_simple_price(&body, "solana", "usd").unwrap(), 171.23);

        let integer = json!({ "solana": { "usd": 150 } });
        assert_eq!(parse_simple_price(&integer, "solana", "usd").unwrap(), 150.0);
    }

    #[test]
    fn test_parse_missing_field() {
        assert!(parse_simple_price(&json!({}), "solana", "usd").is_err());
        assert!(parse_simple_price(&json!({ "solana": {} }), "solana", "usd").is_err());
        assert!(parse_simple_price(&json!({ "solana": { "usd": -1 } }), "solana", "usd").is_err());
    }
}
