//! # IoT Ledger - Tamper-Evident Device Event Log
//!
//! A hash-chained ledger sealed by proof of work, plus an independent
//! signature subsystem for authenticating payloads such as firmware images.
//!
//! ## What Is In Here
//! - **Ledger**: blocks linked by SHA-256 over a canonical encoding, each one
//!   mined until its hash starts with `difficulty` zero hex digits
//! - **Bounded Mining**: a deadline, an attempt cap and a cancel flag keep a
//!   seal from running forever
//! - **Validation**: a full pass over the chain that names the first broken block
//! - **Signing**: ECDSA P-256 or Ed25519 sign/verify over arbitrary bytes
//!
//! ## Code Layout
//! - `core/`: payloads, the canonical hasher, proof of work, the chain and its validator
//! - `signing/`: key pairs, signatures and verification
//! - `config/`: session settings from defaults, TOML and `LEDGER_*` variables
//! - `report/`: read-only snapshots of a chain for display
//! - `simulation/`: generated sensor readings to feed the ledger
//! - `utils/`: hashing, hex and canonical JSON helpers
//! - `cli/`: command-line interface
//!
//! ## Where To Start
//! 1. `core/blockchain.rs` for append, tamper and validate
//! 2. `core/hasher.rs` for exactly which bytes get hashed
//! 3. `core/proof_of_work.rs` for the mining loop and its bounds
//! 4. `signing/keys.rs` for the signature API

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod report;
pub mod signing;
pub mod simulation;
pub mod utils;

#[cfg(test)]
pub mod testnet;

// Re-export commonly used types for convenience
pub use cli::{Command, Opt};
pub use config::{LedgerConfig, DEFAULT_DIFFICULTY};
pub use core::{
    calculate_hash, validate_chain, Block, BlockData, Blockchain, ChainFault, MiningLimits,
    MiningStats, ProofOfWork, Record, Scalar, ValidationReport, MAX_DIFFICULTY,
};
pub use error::{LedgerError, Result};
pub use report::{BlockSummary, ChainReport};
pub use signing::{
    generate_key_pair, sign, verify, KeyPair, PrivateKey, PublicKey, Signature, SignatureScheme,
};
pub use simulation::SensorEventGenerator;
pub use utils::{current_timestamp, hex_decode, hex_encode, sha256_hex};
