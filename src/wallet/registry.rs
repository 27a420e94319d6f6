//! Wallet Registry
//!
//! Ordered collection of wallets derived from one seed. The registry owns the
//! account counter: it advances only when a wallet is successfully derived and
//! is never rewound, so an index is never handed out twice even after removal.

use super::derivation::{derive_solana_keypair, SolanaKeypair};
use super::derivation_path::{DerivationPath, HARDENED};
use super::mnemonic::Seed;
use crate::error::{VaultError, VaultResult};
use crate::types::WalletExport;

/// A derived Solana wallet plus its balance annotation
#[derive(Clone)]
pub struct Wallet {
    index: u32,
    path: DerivationPath,
    keypair: SolanaKeypair,
    balance: Option<f64>,
    balance_loading: bool,
}

impl Wallet {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn path(&self) -> &DerivationPath {
        &self.path
    }

    pub fn address(&self) -> &str {
        self.keypair.address()
    }

    pub fn keypair(&self) -> &SolanaKeypair {
        &self.keypair
    }

    /// Last fetched balance in SOL
    pub fn balance(&self) -> Option<f64> {
        self.balance
    }

    pub fn is_loading_balance(&self) -> bool {
        self.balance_loading
    }

    pub fn to_export(&self) -> WalletExport {
        WalletExport {
            index: self.index,
            path: self.path.to_string(),
            address: self.address().to_string(),
            private_key_hex: self.keypair.private_key_hex().to_string(),
            private_key_base58: self.keypair.private_key_base58().to_string(),
            balance_sol: self.balance,
        }
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("index", &self.index)
            .field("address", &self.address())
            .field("balance", &self.balance)
            .field("balance_loading", &self.balance_loading)
            .finish()
    }
}

/// Wallets derived from one seed, in creation order
#[derive(Debug)]
pub struct WalletRegistry {
    seed: Seed,
    wallets: Vec<Wallet>,
    next_index: u32,
}

impl WalletRegistry {
    pub fn new(seed: Seed) -> Self {
        Self::starting_at(seed, 0)
    }

    /// Registry whose first wallet will be account `first_index`
    pub fn starting_at(seed: Seed, first_index: u32) -> Self {
        Self {
            seed,
            wallets: Vec::new(),
            next_index: first_index,
        }
    }

    /// Derive the wallet at the current counter and append it
    pub fn add(&mut self) -> VaultResult<&Wallet> {
        let index = self.next_index;
        if index >= HARDENED {
            return Err(VaultError::invalid_state("Account index space exhausted"));
        }

        let keypair = derive_solana_keypair(&self.seed, index)?;
        let path = DerivationPath::solana_account(index)?;

        self.wallets.push(Wallet {
            index,
            path,
            keypair,
            balance: None,
            balance_loading: false,
        });
        self.next_index = index + 1;

        Ok(&self.wallets[self.wallets.len() - 1])
    }

    /// Remove the wallet with `index`; the counter is left alone
    pub fn remove(&mut self, index: u32) -> bool {
        let before = self.wallets.len();
        self.wallets.retain(|w| w.index != index);
        self.wallets.len() != before
    }

    pub fn get(&self, index: u32) -> Option<&Wallet> {
        self.wallets.iter().find(|w| w.index == index)
    }

    pub fn wallets(&self) -> &[Wallet] {
        &self.wallets
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    /// Index the next `add` will use
    pub fn next_index(&self) -> u32 {
        self.next_index
    }

    /// `(index, address)` of every wallet, in order
    pub fn addresses(&self) -> Vec<(u32, String)> {
        self.wallets
            .iter()
            .map(|w| (w.index, w.address().to_string()))
            .collect()
    }

    /// Mark a fetch as in flight. False when the wallet is gone.
    pub fn begin_balance_fetch(&mut self, index: u32) -> bool {
        match self.wallets.iter_mut().find(|w| w.index == index) {
            Some(wallet) => {
                wallet.balance_loading = true;
                true
            }
            None => false,
        }
    }

    /// Store a fetch outcome and clear the loading flag.
    /// False (and no change) when the wallet was removed meanwhile.
    pub fn set_balance(&mut self, index: u32, balance: Option<f64>) -> bool {
        match self.wallets.iter_mut().find(|w| w.index == index) {
            Some(wallet) => {
                wallet.balance = balance;
                wallet.balance_loading = false;
                true
            }
            None => false,
        }
    }
}
