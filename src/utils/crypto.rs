use data_encoding::HEXLOWER;
use ring::digest::{Context, SHA256};
use ring::rand::SystemRandom;
use ring::signature::{
    EcdsaKeyPair, Ed25519KeyPair, KeyPair, ECDSA_P256_SHA256_FIXED,
    ECDSA_P256_SHA256_FIXED_SIGNING, ED25519,
};

use crate::error::{LedgerError, Result};
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch, with sub-second precision.
pub fn current_timestamp() -> Result<f64> {
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| LedgerError::Crypto(format!("System time error: {e}")))?;
    Ok(duration.as_secs_f64())
}

pub fn sha256_digest(data: &[u8]) -> Vec<u8> {
    let mut context = Context::new(&SHA256);
    context.update(data);
    let digest = context.finish();
    digest.as_ref().to_vec()
}

/// SHA-256 of `data` as 64 lowercase hex characters.
pub fn sha256_hex(data: &[u8]) -> String {
    HEXLOWER.encode(&sha256_digest(data))
}

pub fn hex_encode(data: &[u8]) -> String {
    HEXLOWER.encode(data)
}

pub fn hex_decode(data: &str) -> Result<Vec<u8>> {
    HEXLOWER
        .decode(data.trim().to_ascii_lowercase().as_bytes())
        .map_err(|e| LedgerError::Serialization(format!("Invalid hex encoding: {e}")))
}

pub fn ecdsa_p256_new_key_pair() -> Result<Vec<u8>> {
    let rng = SystemRandom::new();
    let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, &rng)
        .map_err(|e| LedgerError::Crypto(format!("Failed to generate ECDSA key pair: {e}")))?
        .as_ref()
        .to_vec();
    Ok(pkcs8)
}

pub fn ecdsa_p256_public_key(pkcs8: &[u8]) -> Result<Vec<u8>> {
    let rng = SystemRandom::new();
    let key_pair = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8, &rng)
        .map_err(|e| LedgerError::Crypto(format!("Failed to create key pair from PKCS8: {e}")))?;
    Ok(key_pair.public_key().as_ref().to_vec())
}

pub fn ecdsa_p256_sha256_sign_digest(pkcs8: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    let rng = SystemRandom::new();
    let key_pair = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8, &rng)
        .map_err(|e| LedgerError::Crypto(format!("Failed to create key pair from PKCS8: {e}")))?;
    let signature = key_pair
        .sign(&rng, message)
        .map_err(|e| LedgerError::Crypto(format!("Failed to sign message: {e}")))?
        .as_ref()
        .to_vec();
    Ok(signature)
}

pub fn ecdsa_p256_sha256_sign_verify(public_key: &[u8], signature: &[u8], message: &[u8]) -> bool {
    let peer_public_key =
        ring::signature::UnparsedPublicKey::new(&ECDSA_P256_SHA256_FIXED, public_key);
    peer_public_key.verify(message, signature).is_ok()
}

pub fn ed25519_new_key_pair() -> Result<Vec<u8>> {
    let rng = SystemRandom::new();
    let pkcs8 = Ed25519KeyPair::generate_pkcs8(&rng)
        .map_err(|e| LedgerError::Crypto(format!("Failed to generate Ed25519 key pair: {e}")))?
        .as_ref()
        .to_vec();
    Ok(pkcs8)
}

pub fn ed25519_public_key(pkcs8: &[u8]) -> Result<Vec<u8>> {
    let key_pair = Ed25519KeyPair::from_pkcs8(pkcs8)
        .map_err(|e| LedgerError::Crypto(format!("Failed to create key pair from PKCS8: {e}")))?;
    Ok(key_pair.public_key().as_ref().to_vec())
}

pub fn ed25519_sign(pkcs8: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    let key_pair = Ed25519KeyPair::from_pkcs8(pkcs8)
        .map_err(|e| LedgerError::Crypto(format!("Failed to create key pair from PKCS8: {e}")))?;
    Ok(key_pair.sign(message).as_ref().to_vec())
}

pub fn ed25519_verify(public_key: &[u8], signature: &[u8], message: &[u8]) -> bool {
    let peer_public_key = ring::signature::UnparsedPublicKey::new(&ED25519, public_key);
    peer_public_key.verify(message, signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(sha256_hex(b"").len(), 64);
    }

    #[test]
    fn test_hex_decode_accepts_uppercase() {
        assert_eq!(hex_decode("0aFF").unwrap(), vec![0x0a, 0xff]);
        assert!(hex_decode("zz").is_err());
        assert!(hex_decode("abc").is_err());
    }

    #[test]
    fn test_current_timestamp_is_recent() {
        let now = current_timestamp().unwrap();
        // 2020-01-01 in seconds
        assert!(now > 1_577_836_800.0);
    }

    #[test]
    fn test_ecdsa_sign_and_verify() {
        let pkcs8 = ecdsa_p256_new_key_pair().unwrap();
        let public_key = ecdsa_p256_public_key(&pkcs8).unwrap();
        let signature = ecdsa_p256_sha256_sign_digest(&pkcs8, b"firmware").unwrap();

        assert!(ecdsa_p256_sha256_sign_verify(&public_key, &signature, b"firmware"));
        assert!(!ecdsa_p256_sha256_sign_verify(&public_key, &signature, b"firmwarE"));
    }

    #[test]
    fn test_ed25519_sign_and_verify() {
        let pkcs8 = ed25519_new_key_pair().unwrap();
        let public_key = ed25519_public_key(&pkcs8).unwrap();
        let signature = ed25519_sign(&pkcs8, b"firmware").unwrap();

        assert_eq!(public_key.len(), 32);
        assert!(ed25519_verify(&public_key, &signature, b"firmware"));
        assert!(!ed25519_verify(&public_key, &signature, b"other"));
    }
}
