use crate::error::{LedgerError, Result};
use crate::utils::{
    ecdsa_p256_new_key_pair, ecdsa_p256_public_key, ecdsa_p256_sha256_sign_digest,
    ecdsa_p256_sha256_sign_verify, ed25519_new_key_pair, ed25519_public_key, ed25519_sign,
    ed25519_verify, hex_decode, hex_encode,
};
use log::debug;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

const ED25519_PUBLIC_KEY_LEN: usize = 32;
const ED25519_SIGNATURE_LEN: usize = 64;
// Uncompressed SEC1 point: 0x04 || X || Y
const P256_PUBLIC_KEY_LEN: usize = 65;
const P256_SIGNATURE_LEN: usize = 64;

/// Signature algorithm backing a key pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignatureScheme {
    /// ECDSA over P-256 with SHA-256; randomized signatures.
    #[default]
    #[serde(rename = "ecdsa-p256")]
    EcdsaP256Sha256,
    /// Ed25519; deterministic signatures.
    Ed25519,
}

impl SignatureScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureScheme::EcdsaP256Sha256 => "ecdsa-p256",
            SignatureScheme::Ed25519 => "ed25519",
        }
    }
}

impl FromStr for SignatureScheme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ecdsa-p256" | "ecdsa" | "p256" => Ok(SignatureScheme::EcdsaP256Sha256),
            "ed25519" | "eddsa" => Ok(SignatureScheme::Ed25519),
            _ => Err(format!(
                "Invalid signature scheme: {s}. Valid options: ecdsa-p256, ed25519"
            )),
        }
    }
}

impl fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Private signing key held as a PKCS#8 document. Wiped on drop.
#[derive(Clone)]
pub struct PrivateKey {
    scheme: SignatureScheme,
    pkcs8: Zeroizing<Vec<u8>>,
}

impl PrivateKey {
    pub fn get_scheme(&self) -> SignatureScheme {
        self.scheme
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("scheme", &self.scheme)
            .field("pkcs8", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    scheme: SignatureScheme,
    bytes: Vec<u8>,
}

impl PublicKey {
    /// Wrap raw public key bytes, rejecting lengths the scheme cannot hold.
    pub fn from_bytes(scheme: SignatureScheme, bytes: &[u8]) -> Result<PublicKey> {
        let well_formed = match scheme {
            SignatureScheme::Ed25519 => bytes.len() == ED25519_PUBLIC_KEY_LEN,
            SignatureScheme::EcdsaP256Sha256 => {
                bytes.len() == P256_PUBLIC_KEY_LEN && bytes[0] == 0x04
            }
        };
        if !well_formed {
            return Err(LedgerError::Crypto(format!(
                "Malformed {scheme} public key ({} bytes)",
                bytes.len()
            )));
        }
        Ok(PublicKey {
            scheme,
            bytes: bytes.to_vec(),
        })
    }

    pub fn from_hex(scheme: SignatureScheme, hex: &str) -> Result<PublicKey> {
        Self::from_bytes(scheme, &hex_decode(hex)?)
    }

    pub fn get_scheme(&self) -> SignatureScheme {
        self.scheme
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    pub fn to_hex(&self) -> String {
        hex_encode(&self.bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    scheme: SignatureScheme,
    bytes: Vec<u8>,
}

impl Signature {
    /// Wrap signature bytes as produced by `scheme`. Content is not checked
    /// here: a corrupted signature simply fails verification.
    pub fn from_bytes(scheme: SignatureScheme, bytes: &[u8]) -> Signature {
        Signature {
            scheme,
            bytes: bytes.to_vec(),
        }
    }

    pub fn from_hex(scheme: SignatureScheme, hex: &str) -> Result<Signature> {
        Ok(Self::from_bytes(scheme, &hex_decode(hex)?))
    }

    pub fn get_scheme(&self) -> SignatureScheme {
        self.scheme
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    pub fn to_hex(&self) -> String {
        hex_encode(&self.bytes)
    }

    pub fn expected_len(scheme: SignatureScheme) -> usize {
        match scheme {
            SignatureScheme::Ed25519 => ED25519_SIGNATURE_LEN,
            SignatureScheme::EcdsaP256Sha256 => P256_SIGNATURE_LEN,
        }
    }
}

/// A private key together with its public half. Lives only as long as
/// the caller keeps it; nothing here persists key material.
#[derive(Debug, Clone)]
pub struct KeyPair {
    private_key: PrivateKey,
    public_key: PublicKey,
}

impl KeyPair {
    pub fn generate(scheme: SignatureScheme) -> Result<KeyPair> {
        let pkcs8 = match scheme {
            SignatureScheme::EcdsaP256Sha256 => ecdsa_p256_new_key_pair()?,
            SignatureScheme::Ed25519 => ed25519_new_key_pair()?,
        };
        let key_pair = Self::from_pkcs8(scheme, &pkcs8)?;
        debug!(
            "Generated {scheme} key pair (public key: {})",
            key_pair.public_key.to_hex()
        );
        Ok(key_pair)
    }

    /// Rebuild a key pair from a PKCS#8 document.
    pub fn from_pkcs8(scheme: SignatureScheme, pkcs8: &[u8]) -> Result<KeyPair> {
        let public_bytes = match scheme {
            SignatureScheme::EcdsaP256Sha256 => ecdsa_p256_public_key(pkcs8)?,
            SignatureScheme::Ed25519 => ed25519_public_key(pkcs8)?,
        };
        Ok(KeyPair {
            private_key: PrivateKey {
                scheme,
                pkcs8: Zeroizing::new(pkcs8.to_vec()),
            },
            public_key: PublicKey::from_bytes(scheme, &public_bytes)?,
        })
    }

    pub fn get_scheme(&self) -> SignatureScheme {
        self.public_key.scheme
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn into_parts(self) -> (PrivateKey, PublicKey) {
        (self.private_key, self.public_key)
    }

    pub fn sign(&self, data: impl AsRef<[u8]>) -> Result<Signature> {
        sign(&self.private_key, data)
    }

    pub fn verify(&self, data: impl AsRef<[u8]>, signature: &Signature) -> Result<bool> {
        verify(&self.public_key, data, signature)
    }
}

/// Generate a fresh key pair for `scheme`.
pub fn generate_key_pair(scheme: SignatureScheme) -> Result<KeyPair> {
    KeyPair::generate(scheme)
}

/// Sign the bytes of `data` (text is signed as UTF-8).
pub fn sign(private_key: &PrivateKey, data: impl AsRef<[u8]>) -> Result<Signature> {
    let message = data.as_ref();
    let bytes = match private_key.scheme {
        SignatureScheme::EcdsaP256Sha256 => {
            ecdsa_p256_sha256_sign_digest(&private_key.pkcs8, message)?
        }
        SignatureScheme::Ed25519 => ed25519_sign(&private_key.pkcs8, message)?,
    };
    Ok(Signature {
        scheme: private_key.scheme,
        bytes,
    })
}

/// Check `signature` over `data` under `public_key`.
///
/// Altered data, a different key or corrupted signature bytes yield
/// `Ok(false)`. Only a key and signature from different schemes is an error.
pub fn verify(
    public_key: &PublicKey,
    data: impl AsRef<[u8]>,
    signature: &Signature,
) -> Result<bool> {
    if public_key.scheme != signature.scheme {
        return Err(LedgerError::Crypto(format!(
            "Cannot verify a {} signature with a {} public key",
            signature.scheme, public_key.scheme
        )));
    }
    let message = data.as_ref();
    let valid = match public_key.scheme {
        SignatureScheme::EcdsaP256Sha256 => {
            ecdsa_p256_sha256_sign_verify(&public_key.bytes, &signature.bytes, message)
        }
        SignatureScheme::Ed25519 => ed25519_verify(&public_key.bytes, &signature.bytes, message),
    };
    Ok(valid)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEVICE_DATA: &str = "ID_DISPOSITIVO: 789, DATOS: 42.0";
    const FORGED_DEVICE_DATA: &str = "ID_DISPOSITIVO: 789, DATOS: 99.9";
    const SCHEMES: [SignatureScheme; 2] =
        [SignatureScheme::EcdsaP256Sha256, SignatureScheme::Ed25519];

    #[test]
    fn test_sign_verify_round_trip() {
        for scheme in SCHEMES {
            let key_pair = generate_key_pair(scheme).unwrap();
            let signature = key_pair.sign(DEVICE_DATA).unwrap();

            assert_eq!(signature.as_bytes().len(), Signature::expected_len(scheme));
            assert!(key_pair.verify(DEVICE_DATA, &signature).unwrap());
            assert!(!key_pair.verify(FORGED_DEVICE_DATA, &signature).unwrap());
        }
    }

    #[test]
    fn test_verify_with_other_key_fails() {
        for scheme in SCHEMES {
            let (private_key, _) = generate_key_pair(scheme).unwrap().into_parts();
            let (_, other_public_key) = generate_key_pair(scheme).unwrap().into_parts();

            let signature = sign(&private_key, "Datos").unwrap();
            assert!(!verify(&other_public_key, "Datos", &signature).unwrap());
        }
    }

    #[test]
    fn test_corrupted_signature_fails() {
        for scheme in SCHEMES {
            let key_pair = generate_key_pair(scheme).unwrap();
            let signature = key_pair.sign(b"firmware image").unwrap();

            let mut corrupted = signature.as_bytes().to_vec();
            corrupted[0] ^= 0xff;
            let corrupted = Signature::from_bytes(scheme, &corrupted);
            assert!(!key_pair.verify(b"firmware image", &corrupted).unwrap());

            let truncated = Signature::from_bytes(scheme, &signature.as_bytes()[..10]);
            assert!(!key_pair.verify(b"firmware image", &truncated).unwrap());
        }
    }

    #[test]
    fn test_text_and_bytes_sign_the_same_message() {
        let key_pair = generate_key_pair(SignatureScheme::Ed25519).unwrap();
        let signature = key_pair.sign(DEVICE_DATA).unwrap();
        assert!(key_pair.verify(DEVICE_DATA.as_bytes(), &signature).unwrap());
        // Ed25519 is deterministic
        assert_eq!(signature, key_pair.sign(DEVICE_DATA.as_bytes()).unwrap());
    }

    #[test]
    fn test_scheme_mismatch_is_an_error() {
        let ecdsa = generate_key_pair(SignatureScheme::EcdsaP256Sha256).unwrap();
        let ed25519 = generate_key_pair(SignatureScheme::Ed25519).unwrap();
        let signature = ed25519.sign(DEVICE_DATA).unwrap();

        let err = verify(ecdsa.public_key(), DEVICE_DATA, &signature).unwrap_err();
        assert!(matches!(err, LedgerError::Crypto(_)));
    }

    #[test]
    fn test_public_key_hex_round_trip() {
        for scheme in SCHEMES {
            let key_pair = generate_key_pair(scheme).unwrap();
            let signature = key_pair.sign("payload").unwrap();

            let public_key = PublicKey::from_hex(scheme, &key_pair.public_key().to_hex()).unwrap();
            let signature = Signature::from_hex(scheme, &signature.to_hex()).unwrap();
            assert!(verify(&public_key, "payload", &signature).unwrap());
        }
    }

    #[test]
    fn test_malformed_public_key_rejected() {
        assert!(PublicKey::from_bytes(SignatureScheme::Ed25519, &[0u8; 31]).is_err());
        assert!(PublicKey::from_bytes(SignatureScheme::EcdsaP256Sha256, &[0u8; 65]).is_err());
        assert!(PublicKey::from_bytes(SignatureScheme::EcdsaP256Sha256, &[]).is_err());
        assert!(PublicKey::from_hex(SignatureScheme::Ed25519, "not hex").is_err());
    }

    #[test]
    fn test_from_pkcs8_rejects_garbage() {
        assert!(KeyPair::from_pkcs8(SignatureScheme::Ed25519, b"garbage").is_err());
        assert!(KeyPair::from_pkcs8(SignatureScheme::EcdsaP256Sha256, b"garbage").is_err());
    }

    #[test]
    fn test_private_key_debug_is_redacted() {
        let key_pair = generate_key_pair(SignatureScheme::Ed25519).unwrap();
        let rendered = format!("{:?}", key_pair.private_key());
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_scheme_parsing() {
        assert_eq!(
            "ECDSA-P256".parse::<SignatureScheme>().unwrap(),
            SignatureScheme::EcdsaP256Sha256
        );
        assert_eq!("ed25519".parse::<SignatureScheme>().unwrap(), SignatureScheme::Ed25519);
        assert!("rsa".parse::<SignatureScheme>().is_err());
        assert_eq!(SignatureScheme::default().to_string(), "ecdsa-p256");
    }
}
