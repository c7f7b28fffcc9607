//! The document loader: maps context URLs and DID / key identifiers to JSON
//! documents.
//!
//! Resolution order, first hit wins:
//! 1. preloaded DID documents and their keys (exact match);
//! 2. DID method resolvers (exact URL, exact DID, longest prefix);
//! 3. pinned contexts;
//! 4. network fallback through the configured [`DocumentFetcher`].

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;
use vcsign_core::{DidDocument, DidUrl};

use crate::contexts::ContextRegistry;
use crate::error::LoaderError;
use crate::fetch::DocumentFetcher;
use crate::resolver::{wrap_key_node, DidMethodResolver, ResolverRegistry};

/// A dereferenced document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDocument {
    pub document: Value,
    pub document_url: String,
    pub context_url: Option<String>,
}

impl RemoteDocument {
    fn new(document: Value, url: &str) -> Self {
        Self {
            document,
            document_url: url.to_string(),
            context_url: None,
        }
    }
}

/// Mutable registration phase of a [`DocumentLoader`].
///
/// Every registration after [`finalize`](Self::finalize) fails with
/// [`LoaderError::Configuration`].
#[derive(Default)]
pub struct DocumentLoaderBuilder {
    contexts: ContextRegistry,
    documents: HashMap<String, Value>,
    resolvers: ResolverRegistry,
    fetcher: Option<Arc<dyn DocumentFetcher>>,
    finalized: bool,
}

impl DocumentLoaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a single context document.
    pub fn add_context(
        &mut self,
        url: impl Into<String>,
        document: Value,
    ) -> Result<&mut Self, LoaderError> {
        self.ensure_open()?;
        self.contexts = std::mem::take(&mut self.contexts).add_context(url, document);
        Ok(self)
    }

    /// Register every context of a registry. Later registrations win.
    pub fn add_contexts(&mut self, registry: ContextRegistry) -> Result<&mut Self, LoaderError> {
        self.ensure_open()?;
        self.contexts.merge(registry);
        Ok(self)
    }

    /// Preload a DID document.
    ///
    /// The document is validated and stored without private key material,
    /// under its DID and under each of its key identifiers.
    pub fn add_document(&mut self, document: &DidDocument) -> Result<&mut Self, LoaderError> {
        self.ensure_open()?;
        document
            .validate()
            .map_err(|e| LoaderError::Configuration(format!("invalid DID document: {e}")))?;

        let public = document.public_view();
        for key in public.all_keys() {
            let node = wrap_key_node(serde_json::to_value(key)?);
            self.documents.insert(key.id.clone(), node);
        }
        self.documents.insert(public.id.clone(), public.to_value()?);
        tracing::debug!(did = %document.id, "preloaded DID document");
        Ok(self)
    }

    pub fn add_documents<'a>(
        &mut self,
        documents: impl IntoIterator<Item = &'a DidDocument>,
    ) -> Result<&mut Self, LoaderError> {
        for document in documents {
            self.add_document(document)?;
        }
        Ok(self)
    }

    /// Register a DID method resolver under a match string (a full DID URL,
    /// a DID, or a prefix such as `did:web:`).
    pub fn add_resolver(
        &mut self,
        pattern: impl Into<String>,
        resolver: Arc<dyn DidMethodResolver>,
    ) -> Result<&mut Self, LoaderError> {
        self.ensure_open()?;
        self.resolvers.register(pattern, resolver);
        Ok(self)
    }

    /// Set the network fallback. Without one, unmatched URLs are unresolvable.
    pub fn fetcher(&mut self, fetcher: Arc<dyn DocumentFetcher>) -> Result<&mut Self, LoaderError> {
        self.ensure_open()?;
        self.fetcher = Some(fetcher);
        Ok(self)
    }

    /// Close the registration phase and produce the read-only loader.
    pub fn finalize(&mut self) -> Result<DocumentLoader, LoaderError> {
        self.ensure_open()?;
        self.finalized = true;

        let inner = LoaderInner {
            contexts: std::mem::take(&mut self.contexts),
            documents: std::mem::take(&mut self.documents),
            resolvers: std::mem::take(&mut self.resolvers),
            fetcher: self.fetcher.take(),
        };
        tracing::debug!(
            contexts = inner.contexts.len(),
            documents = inner.documents.len(),
            resolvers = inner.resolvers.len(),
            network = inner.fetcher.is_some(),
            "document loader finalized"
        );
        Ok(DocumentLoader {
            inner: Arc::new(inner),
        })
    }

    fn ensure_open(&self) -> Result<(), LoaderError> {
        if self.finalized {
            return Err(LoaderError::Configuration(
                "document loader is already finalized".into(),
            ));
        }
        Ok(())
    }
}

struct LoaderInner {
    contexts: ContextRegistry,
    documents: HashMap<String, Value>,
    resolvers: ResolverRegistry,
    fetcher: Option<Arc<dyn DocumentFetcher>>,
}

/// Read-only document loader. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct DocumentLoader {
    inner: Arc<LoaderInner>,
}

impl std::fmt::Debug for DocumentLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentLoader")
            .field("contexts", &self.inner.contexts.len())
            .field("documents", &self.inner.documents.len())
            .field("resolvers", &self.inner.resolvers)
            .field("network", &self.inner.fetcher.is_some())
            .finish()
    }
}

impl DocumentLoader {
    pub fn builder() -> DocumentLoaderBuilder {
        DocumentLoaderBuilder::new()
    }

    /// Dereference `url`.
    pub async fn resolve(&self, url: &str) -> Result<RemoteDocument, LoaderError> {
        validate_url(url)?;

        if let Some(document) = self.inner.documents.get(url) {
            tracing::debug!(url = url, source = "preloaded", "document resolved");
            return Ok(RemoteDocument::new(document.clone(), url));
        }

        if let Some((pattern, resolver)) = self.inner.resolvers.lookup(url) {
            tracing::debug!(url = url, pattern = pattern, source = "resolver", "document resolved");
            let document = resolver.resolve(url).await?;
            return Ok(RemoteDocument::new(document, url));
        }

        if let Some(context) = self.inner.contexts.get(url) {
            tracing::debug!(url = url, source = "context", "document resolved");
            return Ok(RemoteDocument::new(context.clone(), url));
        }

        if DidUrl::is_did(url) {
            return Err(LoaderError::unresolvable(
                url,
                "no preloaded document or resolver for this DID",
            ));
        }

        match self.inner.fetcher {
            Some(ref fetcher) => {
                tracing::debug!(url = url, source = "network", "fetching document");
                let document = fetcher.fetch(url).await?;
                Ok(RemoteDocument::new(document, url))
            }
            None => Err(LoaderError::unresolvable(
                url,
                "not preloaded, not pinned, and network fallback is disabled",
            )),
        }
    }

    /// The document for `url`, without the envelope.
    pub async fn document(&self, url: &str) -> Result<Value, LoaderError> {
        Ok(self.resolve(url).await?.document)
    }

    /// Whether `url` names a preloaded DID document or key.
    pub fn is_preloaded(&self, url: &str) -> bool {
        self.inner.documents.contains_key(url)
    }

    pub fn contexts(&self) -> &ContextRegistry {
        &self.inner.contexts
    }
}

fn validate_url(url: &str) -> Result<(), LoaderError> {
    if url.trim().is_empty() {
        return Err(LoaderError::Configuration("empty URL".into()));
    }
    if url.trim() != url {
        return Err(LoaderError::Configuration(format!(
            "URL has surrounding whitespace: {url:?}"
        )));
    }
    if DidUrl::is_did(url) {
        DidUrl::parse(url)
            .map_err(|e| LoaderError::Configuration(format!("malformed DID URL: {e}")))?;
        return Ok(());
    }
    Url::parse(url)
        .map_err(|e| LoaderError::Configuration(format!("malformed URL {url:?}: {e}")))?;
    Ok(())
}
