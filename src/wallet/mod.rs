//! Wallet Module
//!
//! Handles mnemonic generation, SLIP-0010 key derivation, derivation paths
//! and the registry of derived Solana wallets.

mod derivation;
mod derivation_path;
mod mnemonic;
mod registry;

pub use derivation::*;
pub use derivation_path::*;
pub use mnemonic::*;
pub use registry::*;

use crate::error::VaultResult;
use crate::types::DerivedBundle;

/// Create a new phrase with random entropy and a registry over its seed
pub fn create_new_wallet(strength: MnemonicStrength) -> VaultResult<(SecretPhrase, WalletRegistry)> {
    let phrase = generate_phrase(strength)?;
    let registry = WalletRegistry::new(phrase.to_seed("")?);
    Ok((phrase, registry))
}

/// Restore a registry from an existing phrase, first wallet at `first_index`
pub fn restore_from_phrase(
    text: &str,
    policy: MnemonicPolicy,
    first_index: u32,
) -> VaultResult<(SecretPhrase, WalletRegistry)> {
    let phrase = parse_phrase(text, policy)?;
    let registry = WalletRegistry::starting_at(phrase.to_seed("")?, first_index);
    Ok((phrase, registry))
}

/// Derive `count` wallets into `registry` and bundle them with the phrase
pub fn derive_bundle(
    phrase: &SecretPhrase,
    registry: &mut WalletRegistry,
    count: u32,
) -> VaultResult<DerivedBundle> {
    for _ in 0..count {
        registry.add()?;
    }

    Ok(DerivedBundle {
        mnemonic: phrase.as_str().to_string(),
        word_count: phrase.word_count(),
        wallets: registry.wallets().iter().map(Wallet::to_export).collect(),
    })
}
