//! `did:web`: the DID document is served over HTTPS at a location derived
//! from the method-specific id.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;
use vcsign_core::DidUrl;

use crate::error::LoaderError;
use crate::fetch::DocumentFetcher;
use crate::resolver::{select_key_node, DidMethodResolver};

/// HTTPS location of the DID document for a `did:web` DID.
///
/// `did:web:example.com` → `https://example.com/.well-known/did.json`,
/// `did:web:example.com:users:alice` → `https://example.com/users/alice/did.json`.
/// A percent-encoded port (`%3A`) in the host segment is decoded.
pub fn did_web_document_url(did: &DidUrl) -> Result<String, LoaderError> {
    if did.method() != "web" {
        return Err(LoaderError::Configuration(format!(
            "not a did:web identifier: {did}"
        )));
    }

    let mut segments = did.method_specific_id().split(':');
    let host = segments
        .next()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| LoaderError::Configuration(format!("did:web without host: {did}")))?
        .replace("%3A", ":")
        .replace("%3a", ":");
    let path: Vec<&str> = segments.collect();
    if path.iter().any(|s| s.is_empty()) {
        return Err(LoaderError::Configuration(format!(
            "did:web with empty path segment: {did}"
        )));
    }

    let location = if path.is_empty() {
        format!("https://{host}/.well-known/did.json")
    } else {
        format!("https://{host}/{}/did.json", path.join("/"))
    };

    Url::parse(&location)
        .map_err(|e| LoaderError::Configuration(format!("did:web maps to invalid URL {location}: {e}")))?;
    Ok(location)
}

/// Resolver for `did:web` DIDs, fetching through a [`DocumentFetcher`].
pub struct DidWebResolver {
    fetcher: Arc<dyn DocumentFetcher>,
}

impl DidWebResolver {
    pub fn new(fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl DidMethodResolver for DidWebResolver {
    async fn resolve(&self, url: &str) -> Result<Value, LoaderError> {
        let did_url = DidUrl::parse(url)?;
        let location = did_web_document_url(&did_url)?;

        tracing::debug!(did = %did_url.did(), location = %location, "resolving did:web");
        let document = self.fetcher.fetch(&location).await?;

        let did = did_url.did();
        if document.get("id").and_then(Value::as_str) != Some(did.as_str()) {
            return Err(LoaderError::unresolvable(
                url,
                format!("document at {location} does not describe {did}"),
            ));
        }

        match did_url.fragment() {
            None => Ok(document),
            Some(_) => select_key_node(&document, url),
        }
    }
}
