//! Human-readable chain reports
//!
//! Snapshots of a chain for display. Hashes are shortened in the snapshot
//! only; the chain itself is borrowed immutably.

use crate::core::{Block, BlockData, Blockchain, ValidationReport};
use crate::error::Result;
use chrono::{DateTime, Local};
use serde::Serialize;

/// Characters of a hash kept before the ellipsis.
pub const HASH_DISPLAY_LEN: usize = 15;

pub fn truncate_hash(hash: &str) -> String {
    match hash.char_indices().nth(HASH_DISPLAY_LEN) {
        Some((cut, _)) => format!("{}...", &hash[..cut]),
        None => hash.to_string(),
    }
}

/// Local `YYYY-MM-DD HH:MM:SS` rendering of a Unix timestamp in seconds.
pub fn format_timestamp(timestamp: f64) -> String {
    let secs = timestamp.floor();
    let nanos = ((timestamp - secs) * 1e9) as u32;
    DateTime::from_timestamp(secs as i64, nanos)
        .map(|utc| {
            utc.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| format!("{timestamp}"))
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockSummary {
    pub index: u64,
    pub timestamp: String,
    pub data: BlockData,
    pub hash: String,
    pub previous_hash: String,
    pub nonce: u64,
}

impl From<&Block> for BlockSummary {
    fn from(block: &Block) -> Self {
        BlockSummary {
            index: block.get_index(),
            timestamp: format_timestamp(block.get_timestamp()),
            data: block.get_data().clone(),
            hash: truncate_hash(block.get_hash()),
            previous_hash: truncate_hash(block.get_previous_hash()),
            nonce: block.get_nonce(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChainReport {
    pub difficulty: u32,
    pub length: usize,
    pub blocks: Vec<BlockSummary>,
    pub validation: ValidationReport,
}

impl ChainReport {
    pub fn from_chain(blockchain: &Blockchain) -> ChainReport {
        ChainReport {
            difficulty: blockchain.get_difficulty(),
            length: blockchain.len(),
            blocks: blockchain.iter().map(BlockSummary::from).collect(),
            validation: blockchain.validate(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
