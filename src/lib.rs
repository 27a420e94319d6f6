//! CryptoVault Core Library
//!
//! Generates BIP-39 secret phrases and derives Solana wallets from them at
//! `m/44'/501'/n'`, with optional balance and reference-price lookups.
//!
//! # Architecture
//!
//! This crate provides:
//! - **wallet**: Mnemonics, SLIP-0010 derivation, the wallet registry
//! - **balances**: `getBalance` over Solana JSON-RPC
//! - **price**: SOL/USD reference price with fallback
//! - **session**: The generate → phrase → wallets flow and its text UI
//! - **config**: Endpoints, provider keys and timeouts
//!
//! # Security
//!
//! Phrases, seeds and secret keys are held in `zeroize` wrappers and cleared
//! when dropped. Their `Debug` output is redacted, and so are log fields
//! whose names mark them as secret.
//!
//! # Example
//!
//! ```rust,ignore
//! use cryptovault::wallet::{self, MnemonicStrength};
//!
//! let (phrase, mut registry) = wallet::create_new_wallet(MnemonicStrength::Bits128)?;
//! let first = registry.add()?;
//! println!("{} {}", first.path(), first.address());
//! ```

pub mod balances;
pub mod config;
pub mod error;
pub mod price;
pub mod session;
pub mod types;
pub mod utils;
pub mod wallet;

pub use config::VaultConfig;
pub use error::{ErrorCode, VaultError, VaultResult};
pub use types::{Network, PriceQuote};
