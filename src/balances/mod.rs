//! Balance Module
//!
//! Solana `getBalance` lookups and registry annotation.

pub mod fetcher;
pub mod rpc;

pub use fetcher::*;
pub use rpc::*;
