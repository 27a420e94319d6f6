//! Session
//!
//! One user's walk through the generator: produce or enter a phrase, then
//! manage the wallets derived from it. The session owns the phrase, the
//! registry and the presentation state, and gates every operation on the
//! current step.

mod clipboard;
mod commands;
mod view;

pub use clipboard::*;
pub use commands::*;
pub use view::*;

use crate::balances::{fetch_wallet_balance, refresh_all_balances, BalanceProvider};
use crate::error::{VaultError, VaultResult};
use crate::price::PriceTracker;
use crate::types::{Network, PriceQuote};
use crate::wallet::{generate_phrase, parse_phrase, MnemonicPolicy, MnemonicStrength, SecretPhrase, WalletRegistry};
use crate::{log_info, log_warn};

/// Where the user is in the flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Start,
    Phrase,
    Wallets,
}

pub struct Session {
    step: Step,
    phrase: Option<SecretPhrase>,
    registry: Option<WalletRegistry>,
    network: Network,
    policy: MnemonicPolicy,
    view: ViewState,
    balances: Box<dyn BalanceProvider>,
    price: PriceTracker,
    clipboard: Box<dyn Clipboard>,
}

impl Session {
    pub fn new(balances: Box<dyn BalanceProvider>, price: PriceTracker, clipboard: Box<dyn Clipboard>) -> Self {
        Self {
            step: Step::Start,
            phrase: None,
            registry: None,
            network: Network::default(),
            policy: MnemonicPolicy::default(),
            view: ViewState::default(),
            balances,
            price,
            clipboard,
        }
    }

    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    pub fn with_policy(mut self, policy: MnemonicPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn phrase(&self) -> Option<&SecretPhrase> {
        self.phrase.as_ref()
    }

    pub fn registry(&self) -> Option<&WalletRegistry> {
        self.registry.as_ref()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    fn require(&self, allowed: &[Step], action: &str) -> VaultResult<()> {
        if allowed.contains(&self.step) {
            Ok(())
        } else {
            Err(VaultError::invalid_state(format!(
                "Cannot {} in the {:?} step",
                action, self.step
            )))
        }
    }

    fn wallets_mut(&mut self, action: &str) -> VaultResult<&mut WalletRegistry> {
        self.require(&[Step::Wallets], action)?;
        self.registry
            .as_mut()
            .ok_or_else(|| VaultError::internal("Wallets step without a registry"))
    }

    // =========================================================================
    // Phrase
    // =========================================================================

    /// Fresh phrase; calling again from the Phrase step replaces it
    pub fn generate_phrase(&mut self, strength: MnemonicStrength) -> VaultResult<&SecretPhrase> {
        self.require(&[Step::Start, Step::Phrase], "generate a phrase")?;

        let phrase = generate_phrase(strength)?;
        self.view.reset();
        self.step = Step::Phrase;
        log_info!("session", "Secret phrase generated", words = phrase.word_count());
        Ok(self.phrase.insert(phrase))
    }

    /// Enter an existing phrase and go straight to the wallet view
    pub fn use_existing_phrase(&mut self, text: &str) -> VaultResult<()> {
        self.require(&[Step::Start], "use an existing phrase")?;

        let phrase = parse_phrase(text, self.policy)?;
        let registry = WalletRegistry::new(phrase.to_seed("")?);
        self.phrase = Some(phrase);
        self.registry = Some(registry);
        self.view.reset();
        self.step = Step::Wallets;
        log_info!("session", "Existing phrase loaded");
        Ok(())
    }

    /// Derive the seed of the generated phrase and open the wallet view
    pub fn continue_to_wallets(&mut self) -> VaultResult<()> {
        self.require(&[Step::Phrase], "continue to wallets")?;

        let phrase = self
            .phrase
            .as_ref()
            .ok_or_else(|| VaultError::internal("Phrase step without a phrase"))?;
        self.registry = Some(WalletRegistry::new(phrase.to_seed("")?));
        self.step = Step::Wallets;
        Ok(())
    }

    pub fn set_phrase_revealed(&mut self, revealed: bool) -> VaultResult<()> {
        if self.phrase.is_none() {
            return Err(VaultError::invalid_state("No phrase to reveal"));
        }
        self.view.set_phrase_revealed(revealed);
        Ok(())
    }

    /// Copy the phrase. Only a revealed phrase can be copied; returns whether
    /// the clipboard accepted it.
    pub fn copy_phrase(&mut self) -> VaultResult<bool> {
        let phrase = self
            .phrase
            .as_ref()
            .ok_or_else(|| VaultError::invalid_state("No phrase to copy"))?;
        if !self.view.is_phrase_revealed() {
            return Err(VaultError::invalid_state("Reveal the phrase before copying it"));
        }

        let text = zeroize::Zeroizing::new(phrase.as_str().to_string());
        Ok(self.copy_to_clipboard(&text, CopyTarget::Phrase))
    }

    // =========================================================================
    // Wallets
    // =========================================================================

    /// Derive the next wallet; returns its account index
    pub fn add_wallet(&mut self) -> VaultResult<u32> {
        let registry = self.wallets_mut("add a wallet")?;
        let index = registry.add()?.index();
        log_info!("session", "Wallet added", index = index);
        Ok(index)
    }

    /// Remove a wallet from view. The index is not reused.
    pub fn remove_wallet(&mut self, index: u32) -> VaultResult<bool> {
        let removed = self.wallets_mut("delete a wallet")?.remove(index);
        if removed {
            self.view.forget_wallet(index);
        }
        Ok(removed)
    }

    pub fn fetch_balance(&mut self, index: u32) -> VaultResult<Option<f64>> {
        let network = self.network;
        self.require(&[Step::Wallets], "fetch a balance")?;
        let registry = self
            .registry
            .as_mut()
            .ok_or_else(|| VaultError::internal("Wallets step without a registry"))?;
        fetch_wallet_balance(registry, index, self.balances.as_ref(), network)
    }

    /// Fetch every wallet's balance; returns how many succeeded
    pub fn refresh_balances(&mut self) -> VaultResult<usize> {
        let network = self.network;
        self.require(&[Step::Wallets], "fetch balances")?;
        let registry = self
            .registry
            .as_mut()
            .ok_or_else(|| VaultError::internal("Wallets step without a registry"))?;
        Ok(refresh_all_balances(registry, self.balances.as_ref(), network))
    }

    /// Switch cluster. Balances from the previous cluster are cleared.
    pub fn select_network(&mut self, network: Network) -> VaultResult<()> {
        let current = self.network;
        let registry = self.wallets_mut("select a network")?;
        if network == current {
            return Ok(());
        }

        for (index, _) in registry.addresses() {
            registry.set_balance(index, None);
        }
        self.network = network;
        if network.is_mainnet() {
            log_warn!("session", "Switched to mainnet", network = network);
        }
        Ok(())
    }

    /// Flip private-key visibility; returns the new state
    pub fn toggle_private_key(&mut self, index: u32) -> VaultResult<bool> {
        let registry = self.wallets_mut("show a private key")?;
        if registry.get(index).is_none() {
            return Err(VaultError::not_found(format!("No wallet with index {}", index)));
        }
        Ok(self.view.toggle_private_key(index))
    }

    pub fn copy_address(&mut self, index: u32) -> VaultResult<bool> {
        let registry = self.wallets_mut("copy an address")?;
        let address = registry
            .get(index)
            .map(|w| w.address().to_string())
            .ok_or_else(|| VaultError::not_found(format!("No wallet with index {}", index)))?;
        Ok(self.copy_to_clipboard(&address, CopyTarget::Address(index)))
    }

    /// Copy a shown private key in `format`. A hidden key cannot be copied.
    pub fn copy_private_key(&mut self, index: u32, format: KeyFormat) -> VaultResult<bool> {
        let registry = self.wallets_mut("copy a private key")?;
        let keypair = registry
            .get(index)
            .map(|w| w.keypair())
            .ok_or_else(|| VaultError::not_found(format!("No wallet with index {}", index)))?;
        let secret = match format {
            KeyFormat::Hex => keypair.private_key_hex(),
            KeyFormat::Base58 => keypair.private_key_base58(),
        };
        if !self.view.is_private_key_visible(index) {
            return Err(VaultError::invalid_state("Show the private key before copying it"));
        }
        Ok(self.copy_to_clipboard(&secret, CopyTarget::PrivateKey(index)))
    }

    fn copy_to_clipboard(&mut self, text: &str, target: CopyTarget) -> bool {
        match self.clipboard.copy(text) {
            Ok(()) => {
                self.view.mark_copied(target);
                true
            }
            Err(e) => {
                log_warn!("session", "Failed to copy text", error = e);
                false
            }
        }
    }

    // =========================================================================
    // Price & rendering
    // =========================================================================

    pub fn price(&mut self) -> PriceQuote {
        self.price.current()
    }

    /// Text of the current screen
    pub fn render(&mut self) -> String {
        match self.step {
            Step::Start => "Generate a new secret phrase (`generate`) or enter an existing one (`use <phrase>`).\n"
                .to_string(),
            Step::Phrase => {
                let mut out = self
                    .phrase
                    .as_ref()
                    .map(|p| render_phrase(p, &self.view))
                    .unwrap_or_default();
                out.push_str("Write these words down, then `continue` to your wallets.\n");
                out
            }
            Step::Wallets => self.render_wallets(),
        }
    }

    fn render_wallets(&mut self) -> String {
        let has_balances = self
            .registry
            .as_ref()
            .map(|r| r.wallets().iter().any(|w| w.balance().is_some()))
            .unwrap_or(false);
        let quote = if has_balances { Some(self.price.current()) } else { None };

        let mut out = format!("Network: {}\n", self.network.badge());
        if self.network.is_mainnet() {
            out.push_str(MAINNET_WARNING);
            out.push('\n');
        }

        match self.registry.as_ref() {
            Some(registry) if !registry.is_empty() => {
                for wallet in registry.wallets() {
                    out.push('\n');
                    out.push_str(&render_wallet(wallet, &self.view, self.network, quote.as_ref()));
                }
            }
            _ => out.push_str("No wallets yet. Use `new` to derive one.\n"),
        }
        out
    }
}
