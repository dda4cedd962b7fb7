//! Test utilities for ledger testing

use crate::core::{Block, Blockchain, ProofOfWork, Record};

/// Sensor readings used across tests.
pub fn sensor_reading(sensor: &str, value: f64) -> Record {
    Record::new().with("sensor", sensor).with("valor", value)
}

/// Create a chain of `length` blocks (genesis included) mined at `difficulty`.
pub fn create_test_chain(difficulty: u32, length: usize) -> Blockchain {
    let mut blockchain = Blockchain::new(difficulty).unwrap();
    for i in 1..length {
        blockchain
            .append(sensor_reading("temp", 20.0 + i as f64))
            .unwrap();
    }
    blockchain
}

/// The blocks of [`create_test_chain`].
pub fn mined_blocks(difficulty: u32, length: usize) -> Vec<Block> {
    create_test_chain(difficulty, length).blocks().to_vec()
}

/// Copy of `block` pointing at `previous_hash`, freshly mined so that its
/// own hash is consistent.
pub fn reseal(block: &Block, previous_hash: String, difficulty: u32) -> Block {
    let mut forged = Block::new(
        block.get_index(),
        block.get_timestamp(),
        block.get_data().clone(),
        previous_hash,
    );
    ProofOfWork::new(difficulty)
        .unwrap()
        .seal(&mut forged)
        .unwrap();
    forged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_chain() {
        let blockchain = create_test_chain(1, 4);
        assert_eq!(blockchain.len(), 4);
        assert!(blockchain.validate().is_valid());
    }

    #[test]
    fn test_reseal_is_self_consistent() {
        let blocks = mined_blocks(1, 2);
        let forged = reseal(&blocks[1], "ab".repeat(32), 1);

        assert_eq!(forged.get_previous_hash(), "ab".repeat(32));
        assert!(ProofOfWork::validate(&forged, 1));
    }
}
