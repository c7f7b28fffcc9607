/// Document loader errors.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// Caller or build-time mistake: malformed URL, invalid preloaded
    /// document, registration on a finalized builder.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Nothing could produce a document for the URL.
    #[error("unable to resolve {url}: {reason}")]
    UnresolvableReference {
        url: String,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("core error: {0}")]
    Core(#[from] vcsign_core::CoreError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LoaderError {
    /// An unresolvable reference without an underlying cause.
    pub fn unresolvable(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnresolvableReference {
            url: url.into(),
            reason: reason.into(),
            source: None,
        }
    }

    /// An unresolvable reference caused by another error.
    pub fn unresolvable_with<E>(url: impl Into<String>, reason: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::UnresolvableReference {
            url: url.into(),
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }
}
