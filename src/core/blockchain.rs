// The chain controller: owns the blocks, mines new ones onto the tip and
// exposes the explicit tamper operation used to demonstrate detection.
// Everything lives in memory for the lifetime of one session.

use crate::config::LedgerConfig;
use crate::core::validation::{validate_chain, ValidationReport};
use crate::core::{Block, BlockData, MiningStats, ProofOfWork};
use crate::error::Result;
use crate::utils::current_timestamp;
use log::{info, warn};

#[derive(Debug, Clone)]
pub struct Blockchain {
    blocks: Vec<Block>,
    pow: ProofOfWork,
    last_mining_stats: Option<MiningStats>,
}

impl Blockchain {
    // A chain with default mining limits
    pub fn new(difficulty: u32) -> Result<Blockchain> {
        Self::with_proof_of_work(ProofOfWork::new(difficulty)?)
    }

    pub fn with_config(config: &LedgerConfig) -> Result<Blockchain> {
        config.validate()?;
        let pow = ProofOfWork::new(config.difficulty)?.with_limits(config.mining);
        Self::with_proof_of_work(pow)
    }

    // The difficulty of `pow` governs every future append and validation
    pub fn with_proof_of_work(pow: ProofOfWork) -> Result<Blockchain> {
        let genesis = Self::create_genesis_block()?;
        info!(
            "Created chain with difficulty {} (genesis: {})",
            pow.get_difficulty(),
            genesis.get_hash()
        );
        Ok(Blockchain {
            blocks: vec![genesis],
            pow,
            last_mining_stats: None,
        })
    }

    pub fn create_genesis_block() -> Result<Block> {
        Block::generate_genesis_block()
    }

    pub fn get_difficulty(&self) -> u32 {
        self.pow.get_difficulty()
    }

    pub fn get_proof_of_work(&self) -> &ProofOfWork {
        &self.pow
    }

    pub fn get_latest_block(&self) -> &Block {
        // The genesis block is inserted at construction and never removed
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn get_block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    // Always false: a chain holds at least its genesis block
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get_last_mining_stats(&self) -> Option<MiningStats> {
        self.last_mining_stats
    }

    // Mine a block carrying `data` onto the tip. On failure the chain is untouched.
    pub fn append(&mut self, data: impl Into<BlockData>) -> Result<Block> {
        let tip = self.get_latest_block();
        let mut block = Block::new(
            tip.get_index() + 1,
            current_timestamp()?,
            data,
            tip.get_hash(),
        );

        info!(
            "Mining block at index {} (difficulty: {})",
            block.get_index(),
            self.get_difficulty()
        );
        let stats = self.pow.seal(&mut block)?;

        self.blocks.push(block.clone());
        self.last_mining_stats = Some(stats);
        info!(
            "Appended block {}: {} ({:.0} H/s)",
            block.get_index(),
            block.get_hash(),
            stats.hash_rate()
        );
        Ok(block)
    }

    // Overwrite the data of a non-genesis block without rehashing it.
    // Returns false for the genesis block and any index past the tip.
    pub fn tamper(&mut self, index: usize, data: impl Into<BlockData>) -> bool {
        if index == 0 || index >= self.blocks.len() {
            warn!(
                "Refusing to tamper with block {index} (chain length {})",
                self.blocks.len()
            );
            return false;
        }
        self.blocks[index].replace_data(data.into());
        warn!("Block {index} data altered in place; its stored hash is now stale");
        true
    }

    pub fn validate(&self) -> ValidationReport {
        validate_chain(&self.blocks, self.get_difficulty())
    }
}

impl<'a> IntoIterator for &'a Blockchain {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}
