use crate::core::hasher;
use crate::core::BlockData;
use crate::error::Result;
use crate::utils::current_timestamp;
use log::debug;
use serde::Serialize;

/// Payload of the first block of every chain.
pub const GENESIS_DATA: &str = "Bloque Génesis";
/// Sentinel link of the genesis block; not a real digest.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    index: u64,
    timestamp: f64,
    data: BlockData,
    previous_hash: String,
    nonce: u64,
    hash: String,
}

impl Block {
    /// Build an unsealed block: nonce 0 and the hash of its current fields.
    pub fn new(
        index: u64,
        timestamp: f64,
        data: impl Into<BlockData>,
        previous_hash: impl Into<String>,
    ) -> Block {
        let mut block = Block {
            index,
            timestamp,
            data: data.into(),
            previous_hash: previous_hash.into(),
            nonce: 0,
            hash: String::new(),
        };
        block.hash = block.calculate_hash();
        block
    }

    /// Rebuild a block exactly as stored elsewhere, without recomputing its hash.
    pub fn from_parts(
        index: u64,
        timestamp: f64,
        data: BlockData,
        previous_hash: String,
        nonce: u64,
        hash: String,
    ) -> Block {
        Block {
            index,
            timestamp,
            data,
            previous_hash,
            nonce,
            hash,
        }
    }

    pub fn generate_genesis_block() -> Result<Block> {
        let block = Block::new(0, current_timestamp()?, GENESIS_DATA, GENESIS_PREVIOUS_HASH);
        debug!("Created genesis block: {}", block.hash);
        Ok(block)
    }

    /// Hash of the block's current fields, ignoring the stored `hash`.
    pub fn calculate_hash(&self) -> String {
        hasher::calculate_hash(
            self.index,
            self.timestamp,
            &self.data,
            &self.previous_hash,
            self.nonce,
        )
    }

    pub fn get_index(&self) -> u64 {
        self.index
    }

    pub fn get_timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn get_data(&self) -> &BlockData {
        &self.data
    }

    pub fn get_previous_hash(&self) -> &str {
        self.previous_hash.as_str()
    }

    pub fn get_nonce(&self) -> u64 {
        self.nonce
    }

    pub fn get_hash(&self) -> &str {
        self.hash.as_str()
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }

    // Leaves nonce and hash as they were.
    pub(crate) fn replace_data(&mut self, data: BlockData) {
        self.data = data;
    }

    pub(crate) fn set_seal(&mut self, nonce: u64, hash: String) {
        self.nonce = nonce;
        self.hash = hash;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Record;

    #[test]
    fn test_new_block_hashes_its_fields() {
        let block = Block::new(
            1,
            1700000001.25,
            Record::new().with("sensor", "temp").with("valor", 22.5),
            "0".repeat(64),
        );

        assert_eq!(block.get_nonce(), 0);
        assert_eq!(
            block.get_hash(),
            "03dd4697ed3e79f60eb53b9c7a46a2b4230cf54c92f70cdad2fbc2b8c6168a30"
        );
        assert_eq!(block.get_hash(), block.calculate_hash());
    }

    #[test]
    fn test_genesis_block() {
        let genesis = Block::generate_genesis_block().unwrap();

        assert!(genesis.is_genesis());
        assert_eq!(genesis.get_data().as_text(), Some(GENESIS_DATA));
        assert_eq!(genesis.get_previous_hash(), "0");
        assert_eq!(genesis.get_nonce(), 0);
        assert_eq!(genesis.get_hash().len(), 64);
    }

    #[test]
    fn test_replace_data_keeps_hash() {
        let mut block = Block::new(1, 5.0, "original", "0");
        let stored = block.get_hash().to_string();

        block.replace_data(BlockData::from("altered"));

        assert_eq!(block.get_hash(), stored);
        assert_ne!(block.calculate_hash(), stored);
    }

    #[test]
    fn test_from_parts_preserves_stored_hash() {
        let block = Block::from_parts(
            3,
            9.5,
            BlockData::from("x"),
            "prev".to_string(),
            77,
            "f".repeat(64),
        );
        assert_eq!(block.get_hash(), "f".repeat(64));
        assert_eq!(block.get_nonce(), 77);
    }
}
