//! Presentation state and text rendering
//!
//! Reveal toggles and copy confirmations belong to the view, not to the
//! wallets themselves, so they live here and are keyed by wallet index.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::time::{Duration, Instant};

use crate::price::usd_value;
use crate::types::{Network, PriceQuote};
use crate::wallet::{SecretPhrase, Wallet};

/// Placeholder shown for each word while the phrase is hidden
pub const MASKED_WORD: &str = "••••••";

/// How long a "Copied!" marker stays visible
pub const COPIED_MARKER_TTL: Duration = Duration::from_secs(2);

pub const MAINNET_WARNING: &str = "WARNING: connected to Solana Mainnet. This is a development tool and must \
never be used with real funds. Do not send SOL or tokens to these addresses; use Devnet for testing.";

/// What a copy action put on the clipboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CopyTarget {
    Phrase,
    Address(u32),
    PrivateKey(u32),
}

/// Encoding of a copied private key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyFormat {
    /// Lowercase hex of the 64-byte secret key
    #[default]
    Hex,
    /// Base58, as imported by Solana CLI and Phantom
    Base58,
}

#[derive(Debug)]
pub struct ViewState {
    phrase_revealed: bool,
    visible_keys: HashSet<u32>,
    copied: HashMap<CopyTarget, Instant>,
    copied_ttl: Duration,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::with_copied_ttl(COPIED_MARKER_TTL)
    }
}

impl ViewState {
    pub fn with_copied_ttl(copied_ttl: Duration) -> Self {
        Self {
            phrase_revealed: false,
            visible_keys: HashSet::new(),
            copied: HashMap::new(),
            copied_ttl,
        }
    }

    pub fn is_phrase_revealed(&self) -> bool {
        self.phrase_revealed
    }

    pub fn set_phrase_revealed(&mut self, revealed: bool) {
        self.phrase_revealed = revealed;
    }

    /// Flip private-key visibility of one wallet; returns the new state
    pub fn toggle_private_key(&mut self, index: u32) -> bool {
        if self.visible_keys.remove(&index) {
            false
        } else {
            self.visible_keys.insert(index);
            true
        }
    }

    pub fn is_private_key_visible(&self, index: u32) -> bool {
        self.visible_keys.contains(&index)
    }

    pub fn mark_copied(&mut self, target: CopyTarget) {
        self.copied.insert(target, Instant::now());
    }

    pub fn is_copied(&self, target: CopyTarget) -> bool {
        self.copied
            .get(&target)
            .map(|at| at.elapsed() < self.copied_ttl)
            .unwrap_or(false)
    }

    /// Drop everything tied to a removed wallet
    pub fn forget_wallet(&mut self, index: u32) {
        self.visible_keys.remove(&index);
        self.copied
            .retain(|target, _| !matches!(target, CopyTarget::Address(i) | CopyTarget::PrivateKey(i) if *i == index));
    }

    /// Fresh view for a new phrase
    pub fn reset(&mut self) {
        self.phrase_revealed = false;
        self.visible_keys.clear();
        self.copied.clear();
    }
}

fn copied_suffix(view: &ViewState, target: CopyTarget) -> &'static str {
    if view.is_copied(target) {
        "  Copied!"
    } else {
        ""
    }
}

/// Numbered word grid, masked unless revealed
pub fn render_phrase(phrase: &SecretPhrase, view: &ViewState) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Secret Recovery Phrase ({} words){}",
        phrase.word_count(),
        copied_suffix(view, CopyTarget::Phrase)
    );

    for (i, word) in phrase.words().enumerate() {
        let shown = if view.phrase_revealed { word } else { MASKED_WORD };
        let _ = write!(out, "{:>3}. {:<10}", i + 1, shown);
        if (i + 1) % 4 == 0 {
            out.push('\n');
        }
    }
    if phrase.word_count() % 4 != 0 {
        out.push('\n');
    }

    if !phrase.checksum_valid() {
        out.push_str("(checksum not valid; accepted in lenient mode)\n");
    }
    out
}

/// `"{sol} SOL ≈ ${usd} USD"`
pub fn format_balance(sol: f64, quote: Option<&PriceQuote>) -> String {
    match quote {
        Some(q) => format!("{:.6} SOL ≈ ${:.2} USD", sol, usd_value(sol, q)),
        None => format!("{:.6} SOL", sol),
    }
}

/// One wallet card
pub fn render_wallet(wallet: &Wallet, view: &ViewState, network: Network, quote: Option<&PriceQuote>) -> String {
    let index = wallet.index();
    let mut out = String::new();

    let _ = writeln!(out, "Wallet #{}  {}  {}", index, network.badge(), wallet.path());
    let _ = writeln!(
        out,
        "  Public key:  {}{}",
        wallet.address(),
        copied_suffix(view, CopyTarget::Address(index))
    );

    let balance = if wallet.is_loading_balance() {
        "Loading...".to_string()
    } else {
        match wallet.balance() {
            Some(sol) => format_balance(sol, quote),
            None => "not fetched".to_string(),
        }
    };
    let _ = writeln!(out, "  Balance:     {}", balance);

    if view.is_private_key_visible(index) {
        let hex = wallet.keypair().private_key_hex();
        let base58 = wallet.keypair().private_key_base58();
        let _ = writeln!(
            out,
            "  Private key: {}{}",
            hex.as_str(),
            copied_suffix(view, CopyTarget::PrivateKey(index))
        );
        let _ = writeln!(out, "  Base58:      {}", base58.as_str());
    } else {
        let _ = writeln!(
            out,
            "  Private key: {}{}",
            MASKED_WORD.repeat(4),
            copied_suffix(view, CopyTarget::PrivateKey(index))
        );
    }
    out
}
