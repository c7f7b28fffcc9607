//! Multibase (base58btc, `z` prefix) and multicodec key encoding.
//!
//! Ed25519 public keys are `z` + base58btc(`0xed 0x01` ‖ key); private keys
//! are `z` + base58btc(`0x80 0x26` ‖ seed ‖ public key).

use crate::error::CryptoError;

/// Multicodec varint prefix for `ed25519-pub`.
pub const ED25519_PUB_CODEC: [u8; 2] = [0xed, 0x01];
/// Multicodec varint prefix for `ed25519-priv`.
pub const ED25519_PRIV_CODEC: [u8; 2] = [0x80, 0x26];

const BASE58BTC_PREFIX: char = 'z';

/// Encode bytes as multibase base58btc.
pub fn encode_base58btc(bytes: &[u8]) -> String {
    format!("{BASE58BTC_PREFIX}{}", bs58::encode(bytes).into_string())
}

/// Decode a multibase base58btc string.
pub fn decode_base58btc(encoded: &str) -> Result<Vec<u8>, CryptoError> {
    let body = encoded.strip_prefix(BASE58BTC_PREFIX).ok_or_else(|| {
        CryptoError::UnsupportedMultibase(format!(
            "expected base58btc ('z') prefix in {encoded:?}"
        ))
    })?;
    bs58::decode(body)
        .into_vec()
        .map_err(|e| CryptoError::InvalidInput(format!("invalid base58: {e}")))
}

/// Prefix `key` with a multicodec code and encode as multibase base58btc.
pub fn encode_multicodec(codec: [u8; 2], key: &[u8]) -> String {
    let mut bytes = Vec::with_capacity(codec.len() + key.len());
    bytes.extend_from_slice(&codec);
    bytes.extend_from_slice(key);
    encode_base58btc(&bytes)
}

/// Decode a multibase multicodec value, checking and stripping the codec.
pub fn decode_multicodec(codec: [u8; 2], encoded: &str) -> Result<Vec<u8>, CryptoError> {
    let bytes = decode_base58btc(encoded)?;
    match bytes.get(..2) {
        Some(prefix) if prefix == codec => Ok(bytes[2..].to_vec()),
        Some(prefix) => Err(CryptoError::MulticodecMismatch {
            expected: hex::encode(codec),
            actual: hex::encode(prefix),
        }),
        None => Err(CryptoError::InvalidInput(format!(
            "multicodec value too short: {encoded:?}"
        ))),
    }
}
