//! Chain validation
//!
//! Walks a chain from index 1 and stops at the first failing check of the
//! first failing block. Checks run in a fixed order: recomputed hash, link
//! to the previous block, difficulty prefix.

use crate::core::{Block, ProofOfWork};
use log::warn;
use serde::Serialize;
use std::fmt;

pub const VALID_CHAIN_MESSAGE: &str = "chain is valid";

/// First integrity violation found in a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChainFault {
    /// Stored hash differs from the hash of the block's current fields.
    HashMismatch { index: usize },
    /// `previous_hash` differs from the preceding block's stored hash.
    BrokenLink { index: usize },
    /// Stored hash lacks the required zero prefix.
    InsufficientDifficulty { index: usize, difficulty: u32 },
}

impl ChainFault {
    pub fn index(&self) -> usize {
        match self {
            ChainFault::HashMismatch { index }
            | ChainFault::BrokenLink { index }
            | ChainFault::InsufficientDifficulty { index, .. } => *index,
        }
    }
}

impl fmt::Display for ChainFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainFault::HashMismatch { index } => {
                write!(f, "block {index}: hash is incorrect (data altered)")
            }
            ChainFault::BrokenLink { index } => write!(
                f,
                "block {index}: broken link (previous_hash does not match block {})",
                index.saturating_sub(1)
            ),
            ChainFault::InsufficientDifficulty { index, difficulty } => {
                write!(f, "block {index}: does not meet difficulty {difficulty}")
            }
        }
    }
}

/// Result of a validation pass. Never cached; recompute on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub message: String,
    pub fault: Option<ChainFault>,
}

impl ValidationReport {
    fn valid() -> ValidationReport {
        ValidationReport {
            valid: true,
            message: VALID_CHAIN_MESSAGE.to_string(),
            fault: None,
        }
    }

    fn invalid(fault: ChainFault) -> ValidationReport {
        ValidationReport {
            valid: false,
            message: fault.to_string(),
            fault: Some(fault),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// `(valid, message)` pair.
    pub fn as_tuple(&self) -> (bool, &str) {
        (self.valid, self.message.as_str())
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

fn check_block(
    previous: &Block,
    current: &Block,
    index: usize,
    difficulty: u32,
) -> Option<ChainFault> {
    if current.calculate_hash() != current.get_hash() {
        return Some(ChainFault::HashMismatch { index });
    }
    if current.get_previous_hash() != previous.get_hash() {
        return Some(ChainFault::BrokenLink { index });
    }
    if !ProofOfWork::meets_difficulty(current.get_hash(), difficulty) {
        return Some(ChainFault::InsufficientDifficulty { index, difficulty });
    }
    None
}

/// Validate `blocks` in order against `difficulty`. The genesis block is not checked.
pub fn validate_chain(blocks: &[Block], difficulty: u32) -> ValidationReport {
    for (offset, pair) in blocks.windows(2).enumerate() {
        if let Some(fault) = check_block(&pair[0], &pair[1], offset + 1, difficulty) {
            warn!("Chain validation failed: {fault}");
            return ValidationReport::invalid(fault);
        }
    }
    ValidationReport::valid()
}
