use std::sync::Arc;

use vcsign_core::DidDocument;
use vcsign_loader::{
    ContextRegistry, DidKeyResolver, DidWebResolver, DocumentFetcher, DocumentLoader,
};

use crate::error::ServiceError;

/// Loader shared by the issuer and verifier services: pinned contexts plus
/// `extra_contexts`, the given documents preloaded, `did:key` and `did:web`
/// resolvers, and `fetcher` as network fallback.
pub(crate) fn service_loader(
    documents: &[DidDocument],
    extra_contexts: ContextRegistry,
    fetcher: Arc<dyn DocumentFetcher>,
) -> Result<DocumentLoader, ServiceError> {
    let mut builder = DocumentLoader::builder();
    builder
        .add_contexts(ContextRegistry::with_defaults()?)?
        .add_contexts(extra_contexts)?
        .add_documents(documents)?
        .add_resolver("did:key:", Arc::new(DidKeyResolver::new()))?
        .add_resolver("did:web:", Arc::new(DidWebResolver::new(fetcher.clone())))?
        .fetcher(fetcher)?;
    Ok(builder.finalize()?)
}
