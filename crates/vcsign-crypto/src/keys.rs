use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::multibase::{decode_multicodec, encode_multicodec, ED25519_PRIV_CODEC, ED25519_PUB_CODEC};

/// Ed25519 key pair held in memory for the lifetime of a signing session.
/// Private key material is zeroized on drop.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a new random key pair using OS-provided entropy.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Create a key pair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Create a key pair from raw bytes: a 32-byte seed, or a 64-byte
    /// seed ‖ public key (checked against the derived public key).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 32 && bytes.len() != 64 {
            return Err(CryptoError::InvalidKeyLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&bytes[..32]);
        let kp = Self::from_seed(&seed);
        seed.zeroize();

        if bytes.len() == 64 && kp.public_key().as_bytes()[..] != bytes[32..] {
            return Err(CryptoError::KeyMismatch(
                "embedded public key does not match the private seed".into(),
            ));
        }
        Ok(kp)
    }

    /// Decode a `privateKeyMultibase` value (`ed25519-priv` multicodec).
    pub fn from_private_multibase(encoded: &str) -> Result<Self, CryptoError> {
        let mut bytes = decode_multicodec(ED25519_PRIV_CODEC, encoded)?;
        let kp = Self::from_bytes(&bytes);
        bytes.zeroize();
        kp
    }

    /// Encode the private key as `privateKeyMultibase` (seed ‖ public key).
    pub fn to_private_multibase(&self) -> String {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&self.signing_key.to_bytes());
        bytes[32..].copy_from_slice(self.public_key().as_bytes());
        let encoded = encode_multicodec(ED25519_PRIV_CODEC, &bytes);
        bytes.zeroize();
        encoded
    }

    /// Get the public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: self.signing_key.verifying_key(),
        }
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key().to_multibase())
            .finish_non_exhaustive()
    }
}

/// Ed25519 public key for verification operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    verifying_key: VerifyingKey,
}

impl PublicKey {
    /// Create from raw bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes_arr: [u8; 32] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        let verifying_key = VerifyingKey::from_bytes(&bytes_arr)
            .map_err(|e| CryptoError::InvalidInput(format!("invalid public key: {e}")))?;
        Ok(Self { verifying_key })
    }

    /// Get the raw bytes (32 bytes).
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.verifying_key.as_bytes()
    }

    /// Encode as `publicKeyMultibase` (`ed25519-pub` multicodec).
    pub fn to_multibase(&self) -> String {
        encode_multicodec(ED25519_PUB_CODEC, self.as_bytes())
    }

    /// Decode a `publicKeyMultibase` value.
    pub fn from_multibase(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = decode_multicodec(ED25519_PUB_CODEC, encoded)?;
        Self::from_bytes(&bytes)
    }

    /// Decode the `x` member of an OKP/Ed25519 JWK (base64url, no padding).
    pub fn from_jwk_x(x: &str) -> Result<Self, CryptoError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(x)
            .map_err(|e| CryptoError::InvalidInput(format!("invalid base64url: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Encode as the `x` member of an OKP/Ed25519 JWK.
    pub fn to_jwk_x(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.as_bytes())
    }

    /// Encode as hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }
}
