/// Linked-data proof errors.
///
/// Only infrastructure and input-shape problems are errors; a proof that
/// simply does not verify is reported through
/// [`VerificationResult`](crate::VerificationResult).
#[derive(Debug, thiserror::Error)]
pub enum LdpError {
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    #[error("invalid presentation: {0}")]
    InvalidPresentation(String),

    #[error("malformed proof: {0}")]
    MalformedProof(String),

    #[error("unsupported verification key: {0}")]
    UnsupportedKey(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("loader error: {0}")]
    Loader(#[from] vcsign_loader::LoaderError),

    #[error("crypto error: {0}")]
    Crypto(#[from] vcsign_crypto::CryptoError),

    #[error("core error: {0}")]
    Core(#[from] vcsign_core::CoreError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
