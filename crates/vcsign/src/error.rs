use vcsign_core::CoreError;
use vcsign_ldp::LdpError;
use vcsign_loader::LoaderError;

/// Issuer and verifier service errors.
///
/// Lower-layer errors are wrapped transparently so the original error stays
/// available through `source()`; [`ServiceError::kind`] classifies any of them.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("invalid credential request: {0}")]
    InvalidCredentialRequest(String),

    #[error(transparent)]
    Proof(#[from] LdpError),

    #[error(transparent)]
    Loader(#[from] LoaderError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Crypto(#[from] vcsign_crypto::CryptoError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Category of a [`ServiceError`], independent of the layer it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller or deployment mistake; not retryable.
    Configuration,
    /// The signing identifier is unknown to the key store.
    KeyNotFound,
    /// A document could not be dereferenced; may be transient.
    UnresolvableReference,
    /// A proof lacks a required property.
    InvalidProofProperty,
    /// A demo credential request failed verification.
    InvalidCredentialRequest,
    /// Malformed credential, presentation, proof or key.
    InvalidInput,
    Other,
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::KeyNotFound(_) => ErrorKind::KeyNotFound,
            Self::InvalidCredentialRequest(_) => ErrorKind::InvalidCredentialRequest,
            Self::Proof(e) => ldp_kind(e),
            Self::Loader(e) => loader_kind(e),
            Self::Core(e) => core_kind(e),
            Self::Crypto(_) => ErrorKind::InvalidInput,
            Self::Serialization(_) => ErrorKind::Other,
        }
    }
}

fn core_kind(error: &CoreError) -> ErrorKind {
    match error {
        CoreError::Configuration(_) | CoreError::InvalidDid(_) => ErrorKind::Configuration,
        CoreError::InvalidProofProperty(_) => ErrorKind::InvalidProofProperty,
        _ => ErrorKind::Other,
    }
}

fn loader_kind(error: &LoaderError) -> ErrorKind {
    match error {
        LoaderError::Configuration(_) => ErrorKind::Configuration,
        LoaderError::UnresolvableReference { .. } => ErrorKind::UnresolvableReference,
        LoaderError::Core(e) => core_kind(e),
        LoaderError::Serialization(_) => ErrorKind::Other,
    }
}

fn ldp_kind(error: &LdpError) -> ErrorKind {
    match error {
        LdpError::Configuration(_) => ErrorKind::Configuration,
        LdpError::Loader(e) => loader_kind(e),
        LdpError::Core(e) => core_kind(e),
        LdpError::InvalidCredential(_)
        | LdpError::InvalidPresentation(_)
        | LdpError::MalformedProof(_)
        | LdpError::UnsupportedKey(_)
        | LdpError::Crypto(_) => ErrorKind::InvalidInput,
        LdpError::Serialization(_) => ErrorKind::Other,
    }
}
