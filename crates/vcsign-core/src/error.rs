/// Core errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid proof property {0}")]
    InvalidProofProperty(String),

    #[error("invalid DID URL: {0}")]
    InvalidDid(String),

    #[error("canonicalization failed: {0}")]
    Canonicalization(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
