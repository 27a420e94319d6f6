//! Solana JSON-RPC balance source

use reqwest::blocking::Client;
use serde_json::{json, Value};

use crate::config::VaultConfig;
use crate::error::{VaultError, VaultResult};
use crate::types::Network;
use crate::utils;

/// Anything that can report an account balance in lamports
pub trait BalanceProvider: Send + Sync {
    fn get_balance(&self, address: &str, network: Network) -> VaultResult<u64>;
}

/// `getBalance` over HTTP against the configured node provider
pub struct SolanaRpcClient {
    client: Client,
    devnet_url: String,
    mainnet_url: String,
}

impl SolanaRpcClient {
    pub fn new(config: &VaultConfig) -> VaultResult<Self> {
        Ok(Self::with_client(utils::build_client(config)?, config))
    }

    pub fn with_client(client: Client, config: &VaultConfig) -> Self {
        Self {
            client,
            devnet_url: config.rpc_url(Network::Devnet),
            mainnet_url: config.rpc_url(Network::Mainnet),
        }
    }

    pub fn endpoint(&self, network: Network) -> &str {
        match network {
            Network::Devnet => &self.devnet_url,
            Network::Mainnet => &self.mainnet_url,
        }
    }
}

impl BalanceProvider for SolanaRpcClient {
    fn get_balance(&self, address: &str, network: Network) -> VaultResult<u64> {
        let body = get_balance_request(address);
        let response: Value = utils::post_json(&self.client, self.endpoint(network), &body)?;
        parse_balance_response(&response)
    }
}

/// JSON-RPC 2.0 body for `getBalance`
pub fn get_balance_request(address: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "getBalance",
        "params": [address]
    })
}

/// Extract `result.value` (lamports) from a `getBalance` response
pub fn parse_balance_response(response: &Value) -> VaultResult<u64> {
    if let Some(value) = response.get("result").and_then(|r| r.get("value")) {
        return value
            .as_u64()
            .ok_or_else(|| VaultError::parse_error(format!("Balance value is not a lamport count: {}", value)));
    }

    if let Some(error) = response.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown RPC error");
        return Err(VaultError::network_error(message.to_string()));
    }

    Err(VaultError::parse_error("Missing result in RPC response"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_request_shape() {
        let body = get_balance_request("HAgk14JpMQLgt6rVgv7cBQFJWFto5Dqxi472uT3DKpqk");
        assert_eq!(body["jsonrpc"], "2.0");
        assert_eq!(body["method"], "getBalance");
        assert_eq!(body["params"][0], "HAgk14JpMQLgt6rVgv7cBQFJWFto5Dqxi472uT3DKpqk");
    }

    #[test]
    fn test_parse_success() {
        let response = json!({
            "jsonrpc": "2.0",
            "result": { "context": { "slot": 1 }, "value": 2_500_000_000u64 },
            "id": 1
        });
        assert_eq!(parse_balance_response(&response).unwrap(), 2_500_000_000);
    }

    #[test]
    fn test_parse_rpc_error() {
        let response = json!({
            "jsonrpc": "2.0",
            "error": { "code": -32602, "message": "Invalid param: WrongSize" },
            "id": 1
        });
        let err = parse_balance_response(&response).unwrap_err();
        assert_eq!(err.code, ErrorCode::NetworkError);
        assert!(err.message.contains("WrongSize"));
    }

    #[test]
    fn test_parse_malformed() {
        let err = parse_balance_response(&json!({ "result": { "value": "lots" } })).unwrap_err();
        assert_eq!(err.code, ErrorCode::ParseError);

        let err = parse_balance_response(&json!({ "jsonrpc": "2.0" })).unwrap_err();
        assert_eq!(err.code, ErrorCode::ParseError);
    }

    #[test]
    fn test_endpoint_follows_config() {
        let mut config = VaultConfig::default();
        config.set_rpc_override(Network::Mainnet, "http://localhost:8899");
        let client = SolanaRpcClient::new(&config).unwrap();
        assert_eq!(client.endpoint(Network::Mainnet), "http://localhost:8899");
        assert_eq!(client.endpoint(Network::Devnet), "https://api.devnet.solana.com");
    }
}
