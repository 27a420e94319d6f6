//! Key Derivation
//!
//! SLIP-0010 ed25519 derivation from a BIP-39 seed and Solana keypair
//! construction.
//!
//! SECURITY: Extended keys and secret key bytes are zeroized on drop.

use ed25519_dalek::SigningKey;
use hmac::{Hmac, Mac};
use sha2::Sha512;
use solana_sdk::signature::{Keypair, Signer as _};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::derivation_path::{DerivationPath, HARDENED};
use super::mnemonic::Seed;
use crate::error::{VaultError, VaultResult};

type HmacSha512 = Hmac<Sha512>;

/// HMAC key for the SLIP-0010 ed25519 master node
const ED25519_SEED_KEY: &[u8] = b"ed25519 seed";

/// Errors raised inside the derivation primitives
#[derive(Debug, thiserror::Error)]
pub enum DerivationError {
    #[error("invalid seed: {0}")]
    InvalidSeed(String),
    #[error("derivation failed: {0}")]
    DerivationFailed(String),
}

impl From<DerivationError> for VaultError {
    fn from(e: DerivationError) -> Self {
        VaultError::crypto_error(e.to_string())
    }
}

/// A SLIP-0010 node: 32-byte private key plus chain code
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ExtendedKey {
    key: [u8; 32],
    chain_code: [u8; 32],
}

impl ExtendedKey {
    /// Master node from a BIP-39 seed
    pub fn master(seed: &[u8]) -> Result<Self, DerivationError> {
        if seed.len() < 16 || seed.len() > 64 {
            return Err(DerivationError::InvalidSeed(format!(
                "seed must be 16..=64 bytes, got {}",
                seed.len()
            )));
        }

        let mut mac = HmacSha512::new_from_slice(ED25519_SEED_KEY)
            .map_err(|e| DerivationError::DerivationFailed(e.to_string()))?;
        mac.update(seed);
        Ok(Self::from_hmac_output(&mac.finalize().into_bytes()))
    }

    /// Hardened child at `index` (the hardened bit is applied here)
    pub fn derive_hardened(&self, index: u32) -> Result<Self, DerivationError> {
        if index >= HARDENED {
            return Err(DerivationError::DerivationFailed(format!(
                "child index {} out of range",
                index
            )));
        }

        let mut mac = HmacSha512::new_from_slice(&self.chain_code)
            .map_err(|e| DerivationError::DerivationFailed(e.to_string()))?;

        // SLIP-0010: 0x00 || private_key || ser32(index | 2^31)
        mac.update(&[0x00]);
        mac.update(&self.key);
        mac.update(&(index | HARDENED).to_be_bytes());

        Ok(Self::from_hmac_output(&mac.finalize().into_bytes()))
    }

    /// Walk every component of `path` starting from the master node
    pub fn derive_path(seed: &[u8], path: &DerivationPath) -> Result<Self, DerivationError> {
        let mut node = Self::master(seed)?;
        for component in path.components() {
            if !component.hardened {
                return Err(DerivationError::DerivationFailed(
                    "ed25519 only supports hardened derivation".into(),
                ));
            }
            node = node.derive_hardened(component.index)?;
        }
        Ok(node)
    }

    pub fn private_key(&self) -> &[u8; 32] {
        &self.key
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    pub fn public_key(&self) -> [u8; 32] {
        SigningKey::from_bytes(&self.key).verifying_key().to_bytes()
    }

    fn from_hmac_output(output: &[u8]) -> Self {
        let mut key = [0u8; 32];
        let mut chain_code = [0u8; 32];
        key.copy_from_slice(&output[..32]);
        chain_code.copy_from_slice(&output[32..64]);
        Self { key, chain_code }
    }
}

/// An ed25519 keypair in Solana's 64-byte `seed || public key` layout
#[derive(Clone)]
pub struct SolanaKeypair {
    secret: Zeroizing<[u8; 64]>,
    address: String,
}

impl SolanaKeypair {
    /// Build the keypair from a 32-byte private seed.
    ///
    /// The secret key is round-tripped through solana-sdk's `Keypair` so the
    /// stored bytes are exactly what Solana tooling will accept.
    #[allow(deprecated)]
    pub fn from_private_seed(private_seed: &[u8; 32]) -> VaultResult<Self> {
        let signing_key = SigningKey::from_bytes(private_seed);
        let public_key = signing_key.verifying_key().to_bytes();

        let mut secret = Zeroizing::new([0u8; 64]);
        secret[..32].copy_from_slice(private_seed);
        secret[32..].copy_from_slice(&public_key);

        let keypair = Keypair::from_bytes(&secret[..])
            .map_err(|e| VaultError::crypto_error(format!("Invalid Solana keypair: {}", e)))?;
        let address = keypair.pubkey().to_string();

        if address != bs58::encode(public_key).into_string() {
            return Err(VaultError::crypto_error(
                "Solana public key does not match ed25519 public key",
            ));
        }

        Ok(Self { secret, address })
    }

    /// Base58 public address
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        let mut public_key = [0u8; 32];
        public_key.copy_from_slice(&self.secret[32..]);
        public_key
    }

    /// The full 64-byte secret key
    pub fn secret_key_bytes(&self) -> &[u8; 64] {
        &self.secret
    }

    /// Lowercase hex of the 64-byte secret key
    pub fn private_key_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(&self.secret[..]))
    }

    /// Base58 of the 64-byte secret key (wallet import format)
    pub fn private_key_base58(&self) -> Zeroizing<String> {
        Zeroizing::new(bs58::encode(&self.secret[..]).into_string())
    }
}

impl std::fmt::Debug for SolanaKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaKeypair")
            .field("address", &self.address)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Derive the Solana keypair for account `index` (`m/44'/501'/{index}'`)
pub fn derive_solana_keypair(seed: &Seed, index: u32) -> VaultResult<SolanaKeypair> {
    let path = DerivationPath::solana_account(index)?;
    derive_keypair_at(seed, &path)
}

/// Derive the Solana keypair at an arbitrary hardened path
pub fn derive_keypair_at(seed: &Seed, path: &DerivationPath) -> VaultResult<SolanaKeypair> {
    let node = ExtendedKey::derive_path(seed.as_bytes(), path)?;
    SolanaKeypair::from_private_seed(node.private_key())
}

#[cfg(test)]
mod tests {
    use super::*;

    // SLIP-0010 test vector 1 for ed25519
    const VECTOR_SEED: &str = "000102030405060708090a0b0c0d0e0f";

    #[test]
    fn test_slip10_master_vector() {
        let seed = hex::decode(VECTOR_SEED).unwrap();
        let master = ExtendedKey::master(&seed).unwrap();

        assert_eq!(
            hex::encode(master.private_key()),
            "2b4be7f19ee27bbf30c667b642d5f4aa69fd169872f8fc3059c08ebae2eb19e7"
        );
        assert_eq!(
            hex::encode(master.chain_code()),
            "90046a93de5380a72b5e45010748567d5ea02bbf6522f979e05c0d8d8ca9fffb"
        );
        assert_eq!(
            hex::encode(master.public_key()),
            "a4b2856bfec510abab89753fac1ac0e1112364e7d250545963f135f2a33188ed"
        );
    }

    #[test]
    fn test_slip10_first_hardened_child() {
        let seed = hex::decode(VECTOR_SEED).unwrap();
        let path = DerivationPath::parse("m/0'").unwrap();
        let child = ExtendedKey::derive_path(&seed, &path).unwrap();

        assert_eq!(
            hex::encode(child.private_key()),
            "68e0fe46dfb67e368c75379acec591dad19df3cde26e63b93a8e704f1dade7a3"
        );
    }

    #[test]
    fn test_master_rejects_short_seed() {
        assert!(ExtendedKey::master(&[0u8; 8]).is_err());
    }

    #[test]
    fn test_keypair_layout() {
        let keypair = SolanaKeypair::from_private_seed(&[7u8; 32]).unwrap();
        let secret = keypair.secret_key_bytes();

        assert_eq!(&secret[..32], &[7u8; 32]);
        assert_eq!(&secret[32..], &keypair.public_key_bytes());
        assert_eq!(keypair.private_key_hex().len(), 128);
        assert_eq!(
            bs58::decode(keypair.address()).into_vec().unwrap(),
            keypair.public_key_bytes().to_vec()
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let keypair = SolanaKeypair::from_private_seed(&[1u8; 32]).unwrap();
        let debug = format!("{:?}", keypair);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains(&*keypair.private_key_hex()));
    }
}
