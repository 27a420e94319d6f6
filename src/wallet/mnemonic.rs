//! Mnemonic Generation and Parsing
//!
//! Creates BIP-39 phrases from OS entropy and turns user-supplied phrases
//! into seeds.
//!
//! SECURITY: Entropy, phrases and seeds are zeroized on drop.

use bip39::{Language, Mnemonic};
use rand::rngs::OsRng;
use rand::RngCore;
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

use crate::error::{VaultError, VaultResult};
use crate::log_warn;

/// Entropy strength of a generated phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MnemonicStrength {
    #[default]
    Bits128,
    Bits160,
    Bits192,
    Bits224,
    Bits256,
}

impl MnemonicStrength {
    pub const ALL: [MnemonicStrength; 5] = [
        MnemonicStrength::Bits128,
        MnemonicStrength::Bits160,
        MnemonicStrength::Bits192,
        MnemonicStrength::Bits224,
        MnemonicStrength::Bits256,
    ];

    pub fn from_bits(bits: usize) -> VaultResult<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.bits() == bits)
            .ok_or_else(|| {
                VaultError::invalid_input(format!(
                    "Unsupported entropy strength {} (use 128, 160, 192, 224 or 256)",
                    bits
                ))
            })
    }

    pub fn from_word_count(words: usize) -> VaultResult<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.word_count() == words)
            .ok_or_else(|| {
                VaultError::invalid_input(format!(
                    "Unsupported word count {} (use 12, 15, 18, 21 or 24)",
                    words
                ))
            })
    }

    pub fn bits(&self) -> usize {
        match self {
            MnemonicStrength::Bits128 => 128,
            MnemonicStrength::Bits160 => 160,
            MnemonicStrength::Bits192 => 192,
            MnemonicStrength::Bits224 => 224,
            MnemonicStrength::Bits256 => 256,
        }
    }

    pub fn entropy_bytes(&self) -> usize {
        self.bits() / 8
    }

    /// Every 32 bits of entropy add one checksum bit; 11 bits per word
    pub fn word_count(&self) -> usize {
        (self.bits() + self.bits() / 32) / 11
    }
}

/// How strictly user-supplied phrases are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MnemonicPolicy {
    /// Wordlist membership and checksum must both hold
    #[default]
    Strict,
    /// Checksum failures are accepted with a warning
    Lenient,
}

/// A normalized English BIP-39 phrase
#[derive(Clone)]
pub struct SecretPhrase {
    phrase: Zeroizing<String>,
    checksum_valid: bool,
}

impl SecretPhrase {
    pub fn as_str(&self) -> &str {
        &self.phrase
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.phrase.split(' ')
    }

    pub fn word_count(&self) -> usize {
        self.words().count()
    }

    /// False only for phrases accepted under `MnemonicPolicy::Lenient`
    pub fn checksum_valid(&self) -> bool {
        self.checksum_valid
    }

    /// PBKDF2 seed for this phrase and `passphrase`
    pub fn to_seed(&self, passphrase: &str) -> VaultResult<Seed> {
        // Always parseable: the phrase was checked on construction
        let mnemonic =
            Mnemonic::parse_in_normalized_without_checksum_check(Language::English, &self.phrase)?;
        let passphrase: Zeroizing<String> = Zeroizing::new(passphrase.nfkd().collect());
        Ok(Seed(Zeroizing::new(mnemonic.to_seed_normalized(&passphrase))))
    }
}

impl std::fmt::Debug for SecretPhrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretPhrase")
            .field("words", &self.word_count())
            .field("checksum_valid", &self.checksum_valid)
            .finish()
    }
}

/// 64-byte BIP-39 seed
#[derive(Clone)]
pub struct Seed(Zeroizing<[u8; 64]>);

impl Seed {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }
}

impl std::fmt::Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Seed([REDACTED])")
    }
}

/// Generate a fresh phrase from OS randomness
pub fn generate_phrase(strength: MnemonicStrength) -> VaultResult<SecretPhrase> {
    let mut entropy = Zeroizing::new(vec![0u8; strength.entropy_bytes()]);
    OsRng.fill_bytes(entropy.as_mut_slice());

    let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy)
        .map_err(|e| VaultError::crypto_error(format!("Failed to create mnemonic: {}", e)))?;

    Ok(SecretPhrase {
        phrase: Zeroizing::new(mnemonic.to_string()),
        checksum_valid: true,
    })
}

/// Parse a user-supplied phrase under `policy`.
///
/// Input is trimmed, NFKD-normalized, lowercased and whitespace-collapsed.
/// Empty input is an `InvalidInput` error regardless of policy.
pub fn parse_phrase(text: &str, policy: MnemonicPolicy) -> VaultResult<SecretPhrase> {
    let normalized = normalize_phrase(text);
    if normalized.is_empty() {
        return Err(VaultError::invalid_input("Seed phrase is empty"));
    }

    match Mnemonic::parse_in_normalized(Language::English, &normalized) {
        Ok(_) => Ok(SecretPhrase {
            phrase: normalized,
            checksum_valid: true,
        }),
        Err(bip39::Error::InvalidChecksum) if policy == MnemonicPolicy::Lenient => {
            Mnemonic::parse_in_normalized_without_checksum_check(Language::English, &normalized)?;
            log_warn!(
                "mnemonic",
                "Accepting phrase with invalid checksum; derived keys are non-standard",
                words = normalized.split(' ').count()
            );
            Ok(SecretPhrase {
                phrase: normalized,
                checksum_valid: false,
            })
        }
        Err(e) => Err(VaultError::invalid_mnemonic(format!("Invalid mnemonic: {}", e))),
    }
}

/// Check a phrase under the strict policy
pub fn is_valid_phrase(text: &str) -> bool {
    parse_phrase(text, MnemonicPolicy::Strict).is_ok()
}

fn normalize_phrase(text: &str) -> Zeroizing<String> {
    let decomposed: Zeroizing<String> = Zeroizing::new(text.nfkd().collect());
    let lowered = Zeroizing::new(decomposed.to_lowercase());
    Zeroizing::new(lowered.split_whitespace().collect::<Vec<_>>().join(" "))
}
