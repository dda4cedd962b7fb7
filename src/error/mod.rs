//! Error handling for the ledger
//!
//! This module provides the error type shared by mining, configuration and
//! signing. Expected negative outcomes (an invalid chain, a rejected tamper,
//! a signature that does not match) are values, not errors.

use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Error types for ledger operations
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerError {
    /// Cryptographic operation errors
    Crypto(String),
    /// Configuration errors
    Config(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// File I/O errors
    Io(String),
    /// Difficulty outside the range a SHA-256 hex digest can satisfy
    InvalidDifficulty { difficulty: u32, max: u32 },
    /// The miner hit its deadline or attempt cap before sealing the block
    MiningTimeout { attempts: u64, elapsed_ms: u128 },
    /// The miner was asked to stop through its cancel flag
    MiningCancelled { attempts: u64 },
    /// Other mining errors
    Mining(String),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::Crypto(msg) => write!(f, "Cryptographic error: {msg}"),
            LedgerError::Config(msg) => write!(f, "Configuration error: {msg}"),
            LedgerError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            LedgerError::Io(msg) => write!(f, "I/O error: {msg}"),
            LedgerError::InvalidDifficulty { difficulty, max } => {
                write!(
                    f,
                    "Invalid difficulty: {difficulty} is outside valid range [0, {max}]"
                )
            }
            LedgerError::MiningTimeout {
                attempts,
                elapsed_ms,
            } => {
                write!(
                    f,
                    "Mining timed out after {attempts} attempts ({elapsed_ms} ms)"
                )
            }
            LedgerError::MiningCancelled { attempts } => {
                write!(f, "Mining cancelled after {attempts} attempts")
            }
            LedgerError::Mining(msg) => write!(f, "Mining error: {msg}"),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for LedgerError {
    fn from(err: toml::de::Error) -> Self {
        LedgerError::Config(err.to_string())
    }
}
