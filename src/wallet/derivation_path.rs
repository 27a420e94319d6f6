//! Solana Derivation Paths
//!
//! Typed BIP-44 paths for ed25519 derivation. Solana accounts live at
//! `m/44'/501'/{account}'`. SLIP-0010 over ed25519 only defines hardened
//! children, so every component must carry a hardened marker.

use std::fmt;
use std::str::FromStr;

use crate::error::{ErrorCode, VaultError, VaultResult};

/// BIP-44 purpose
pub const BIP44_PURPOSE: u32 = 44;

/// SLIP-0044 coin type for Solana
pub const SOLANA_COIN_TYPE: u32 = 501;

/// Hardened offset for BIP-32 style derivation
pub const HARDENED: u32 = 0x8000_0000;

/// Single component of a derivation path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivationComponent {
    pub index: u32,
    pub hardened: bool,
}

impl DerivationComponent {
    pub fn hardened(index: u32) -> Self {
        Self { index, hardened: true }
    }

    /// Get the full index including hardened bit
    pub fn full_index(&self) -> u32 {
        if self.hardened {
            self.index | HARDENED
        } else {
            self.index
        }
    }
}

impl fmt::Display for DerivationComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hardened {
            write!(f, "{}'", self.index)
        } else {
            write!(f, "{}", self.index)
        }
    }
}

/// Parsed, hardened-only derivation path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationPath {
    components: Vec<DerivationComponent>,
}

impl DerivationPath {
    /// `m/44'/501'/{account}'`
    pub fn solana_account(account: u32) -> VaultResult<Self> {
        if account >= HARDENED {
            return Err(VaultError::new(
                ErrorCode::InvalidPath,
                format!("Account index {} exceeds the hardened range", account),
            ));
        }
        Ok(Self {
            components: vec![
                DerivationComponent::hardened(BIP44_PURPOSE),
                DerivationComponent::hardened(SOLANA_COIN_TYPE),
                DerivationComponent::hardened(account),
            ],
        })
    }

    /// Parse a path such as `m/44'/501'/0'` or `m/44h/501h/0h`
    pub fn parse(path: &str) -> VaultResult<Self> {
        let trimmed = path.trim();
        let mut parts = trimmed.split('/');

        match parts.next() {
            Some("m") | Some("M") => {}
            _ => return Err(path_error(trimmed, "path must start with 'm'")),
        }

        let mut components = Vec::new();
        for part in parts {
            components.push(parse_component(trimmed, part)?);
        }

        Ok(Self { components })
    }

    pub fn components(&self) -> &[DerivationComponent] {
        &self.components
    }

    pub fn depth(&self) -> usize {
        self.components.len()
    }

    /// Account index when this is a standard Solana account path
    pub fn solana_account_index(&self) -> Option<u32> {
        match self.components.as_slice() {
            [purpose, coin, account]
                if purpose.index == BIP44_PURPOSE && coin.index == SOLANA_COIN_TYPE =>
            {
                Some(account.index)
            }
            _ => None,
        }
    }
}

fn parse_component(path: &str, part: &str) -> VaultResult<DerivationComponent> {
    if part.is_empty() {
        return Err(path_error(path, "empty path component"));
    }

    let (digits, hardened) = match part.strip_suffix(['\'', 'h', 'H']) {
        Some(rest) => (rest, true),
        None => (part, false),
    };

    let index: u32 = digits
        .parse()
        .map_err(|_| path_error(path, &format!("invalid index '{}'", part)))?;

    if index >= HARDENED {
        return Err(path_error(path, &format!("index {} out of range", index)));
    }
    if !hardened {
        return Err(path_error(
            path,
            &format!("component '{}' is not hardened; ed25519 requires hardened derivation", part),
        ));
    }

    Ok(DerivationComponent::hardened(index))
}

fn path_error(path: &str, reason: &str) -> VaultError {
    VaultError::new(ErrorCode::InvalidPath, format!("Invalid derivation path '{}'", path))
        .with_details(reason.to_string())
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for component in &self.components {
            write!(f, "/{}", component)?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solana_account_path() {
        let path = DerivationPath::solana_account(0).unwrap();
        assert_eq!(path.to_string(), "m/44'/501'/0'");

        let path = DerivationPath::solana_account(7).unwrap();
        assert_eq!(path.to_string(), "m/44'/501'/7'");
        assert_eq!(path.solana_account_index(), Some(7));
    }

    #[test]
    fn test_parse_accepts_both_markers() {
        let a = DerivationPath::parse("m/44'/501'/3'").unwrap();
        let b = DerivationPath::parse("m/44h/501h/3h").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.depth(), 3);
        assert_eq!(a.components()[1].full_index(), 501 | HARDENED);
    }

    #[test]
    fn test_parse_rejects_unhardened() {
        let err = DerivationPath::parse("m/44'/501'/0'/0").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPath);
    }

    #[test]
    fn test_parse_rejects_bad_root() {
        assert!(DerivationPath::parse("44'/501'/0'").is_err());
        assert!(DerivationPath::parse("m//501'").is_err());
        assert!(DerivationPath::parse("m/abc'").is_err());
    }

    #[test]
    fn test_root_only_path() {
        let path = DerivationPath::parse("m").unwrap();
        assert_eq!(path.depth(), 0);
        assert_eq!(path.to_string(), "m");
        assert_eq!(path.solana_account_index(), None);
    }

    #[test]
    fn test_account_out_of_range() {
        assert!(DerivationPath::solana_account(HARDENED).is_err());
    }
}
