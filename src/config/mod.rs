//! Configuration management
//!
//! This module handles the settings of a ledger session: proof-of-work
//! difficulty, mining bounds and the signature scheme.

pub mod settings;

pub use settings::{LedgerConfig, DEFAULT_DIFFICULTY};
