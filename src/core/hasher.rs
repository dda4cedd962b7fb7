//! Block hashing
//!
//! A block hash is SHA-256 over the canonical JSON encoding of exactly five
//! fields: `data`, `index`, `nonce`, `previous_hash` and `timestamp`.

use crate::core::data::{BlockData, CanonicalData};
use crate::utils::{sha256_hex, to_canonical_bytes, CanonicalFloat};
use serde::Serialize;

/// Hashing pre-image. Field declaration order is the sorted key order.
#[derive(Serialize)]
struct HashInput<'a> {
    data: CanonicalData<'a>,
    index: u64,
    nonce: u64,
    previous_hash: &'a str,
    timestamp: CanonicalFloat,
}

/// Canonical byte string fed to the digest.
pub fn canonical_block_bytes(
    index: u64,
    timestamp: f64,
    data: &BlockData,
    previous_hash: &str,
    nonce: u64,
) -> Vec<u8> {
    let input = HashInput {
        data: data.canonical(),
        index,
        nonce,
        previous_hash,
        timestamp: CanonicalFloat(timestamp),
    };
    to_canonical_bytes(&input).expect("Canonical block encoding writes to memory and cannot fail")
}

/// Hex-encoded SHA-256 digest of a block's fields.
pub fn calculate_hash(
    index: u64,
    timestamp: f64,
    data: &BlockData,
    previous_hash: &str,
    nonce: u64,
) -> String {
    sha256_hex(&canonical_block_bytes(
        index,
        timestamp,
        data,
        previous_hash,
        nonce,
    ))
}
