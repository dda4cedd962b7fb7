//! Payload signing
//!
//! Asymmetric sign/verify for arbitrary byte payloads such as firmware
//! images or device readings. Independent of chain state.

pub mod keys;

pub use keys::{
    generate_key_pair, sign, verify, KeyPair, PrivateKey, PublicKey, Signature, SignatureScheme,
};
