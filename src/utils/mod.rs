//! Utility functions and helpers
//!
//! This module contains cryptographic primitives, hex encoding and the
//! canonical JSON encoding used throughout the ledger.

pub mod crypto;
pub mod serialization;

pub use crypto::{
    current_timestamp, ecdsa_p256_new_key_pair, ecdsa_p256_public_key,
    ecdsa_p256_sha256_sign_digest, ecdsa_p256_sha256_sign_verify, ed25519_new_key_pair,
    ed25519_public_key, ed25519_sign, ed25519_verify, hex_decode, hex_encode, sha256_digest,
    sha256_hex,
};

pub use serialization::{float_repr, to_canonical_bytes, CanonicalFloat, CanonicalFormatter};
