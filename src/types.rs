//! Shared types for CryptoVault
//!
//! Data structures that cross module boundaries or leave the process as
//! JSON are defined here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Network Types
// =============================================================================

/// Solana cluster a balance lookup is sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    #[default]
    Devnet,
    Mainnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Devnet => "devnet",
            Network::Mainnet => "mainnet",
        }
    }

    /// Short badge shown next to each wallet
    pub fn badge(&self) -> &'static str {
        match self {
            Network::Devnet => "[devnet]",
            Network::Mainnet => "[MAINNET]",
        }
    }

    pub fn is_mainnet(&self) -> bool {
        matches!(self, Network::Mainnet)
    }

    /// Public RPC endpoint used when no provider key is configured
    pub fn public_rpc_url(&self) -> &'static str {
        match self {
            Network::Devnet => "https://api.devnet.solana.com",
            Network::Mainnet => "https://api.mainnet-beta.solana.com",
        }
    }

    /// Alchemy endpoint prefix; the API key is appended verbatim
    pub fn alchemy_rpc_prefix(&self) -> &'static str {
        match self {
            Network::Devnet => "https://solana-devnet.g.alchemy.com/v2/",
            Network::Mainnet => "https://solana-mainnet.g.alchemy.com/v2/",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "devnet" | "dev" => Ok(Network::Devnet),
            "mainnet" | "mainnet-beta" | "main" => Ok(Network::Mainnet),
            _ => Err(format!("unknown network: {} (use devnet or mainnet)", s)),
        }
    }
}

// =============================================================================
// Export Types
// =============================================================================

/// One derived wallet as printed by `--json` output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletExport {
    pub index: u32,
    pub path: String,
    pub address: String,
    pub private_key_hex: String,
    pub private_key_base58: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_sol: Option<f64>,
}

/// A phrase together with the wallets derived from it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedBundle {
    pub mnemonic: String,
    pub word_count: usize,
    pub wallets: Vec<WalletExport>,
}

/// Result of a single balance lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceReport {
    pub network: Network,
    pub address: String,
    pub lamports: u64,
    pub sol: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usd: Option<f64>,
}

/// Reference price of SOL in USD
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub usd: f64,
    /// True when the provider failed and the fallback constant was used
    pub is_fallback: bool,
}
