/// Cryptographic operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("signature verification failed")]
    SignatureVerificationFailed,

    #[error("unsupported multibase encoding: {0}")]
    UnsupportedMultibase(String),

    #[error("unexpected multicodec prefix: expected {expected}, got {actual}")]
    MulticodecMismatch { expected: String, actual: String },

    #[error("key mismatch: {0}")]
    KeyMismatch(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}
