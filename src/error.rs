//! Unified error types for CryptoVault
//!
//! Every fallible operation in the crate returns `VaultResult`. Errors carry
//! a machine-readable code so the session layer can decide what to surface
//! and what to degrade silently.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for all vault operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl VaultError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg)
    }

    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidAddress, msg)
    }

    pub fn invalid_mnemonic(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidMnemonic, msg)
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidState, msg)
    }

    pub fn network_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkError, msg)
    }

    pub fn crypto_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::CryptoError, msg)
    }

    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, msg)
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, msg)
    }

    pub fn clipboard_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ClipboardError, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }
}

impl fmt::Display for VaultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for VaultError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Input errors
    InvalidInput,
    InvalidAddress,
    InvalidMnemonic,
    InvalidPath,
    InvalidState,
    NotFound,

    // Network errors
    NetworkError,
    Timeout,

    // Crypto errors
    CryptoError,

    // Parse errors
    ParseError,
    JsonError,

    // Environment
    ConfigError,
    ClipboardError,

    // Internal
    Internal,
}

/// Result type alias for vault operations
pub type VaultResult<T> = Result<T, VaultError>;

// Conversions from common error types

impl From<serde_json::Error> for VaultError {
    fn from(e: serde_json::Error) -> Self {
        VaultError::new(ErrorCode::JsonError, e.to_string())
    }
}

impl From<std::io::Error> for VaultError {
    fn from(e: std::io::Error) -> Self {
        VaultError::new(ErrorCode::Internal, e.to_string())
    }
}

impl From<reqwest::Error> for VaultError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            VaultError::new(ErrorCode::Timeout, "Request timed out")
        } else if e.is_connect() {
            VaultError::new(ErrorCode::NetworkError, "Connection failed")
        } else {
            VaultError::new(ErrorCode::NetworkError, e.to_string())
        }
    }
}

impl From<bip39::Error> for VaultError {
    fn from(e: bip39::Error) -> Self {
        VaultError::new(ErrorCode::InvalidMnemonic, format!("BIP39 error: {}", e))
    }
}

impl From<url::ParseError> for VaultError {
    fn from(e: url::ParseError) -> Self {
        VaultError::new(ErrorCode::ConfigError, format!("Invalid URL: {}", e))
    }
}
