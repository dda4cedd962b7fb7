//! Core ledger functionality
//!
//! This module contains the hash-chained ledger: block payloads, the
//! canonical hasher, proof-of-work sealing, chain validation and the chain
//! controller that ties them together.

pub mod block;
pub mod blockchain;
pub mod data;
pub mod hasher;
pub mod proof_of_work;
pub mod validation;

pub use block::{Block, GENESIS_DATA, GENESIS_PREVIOUS_HASH};
pub use blockchain::Blockchain;
pub use data::{BlockData, Record, Scalar};
pub use hasher::{calculate_hash, canonical_block_bytes};
pub use proof_of_work::{
    MiningLimits, MiningStats, ProofOfWork, DEFAULT_MINING_TIMEOUT, MAX_DIFFICULTY,
};
pub use validation::{validate_chain, ChainFault, ValidationReport, VALID_CHAIN_MESSAGE};
