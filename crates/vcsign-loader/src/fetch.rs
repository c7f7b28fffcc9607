//! Network fallback for documents that are neither preloaded, resolved by a
//! DID method driver, nor pinned.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::Value;
use url::Url;

use crate::error::LoaderError;

const ACCEPT_JSON_LD: &str = "application/ld+json, application/json";

/// Fetches a JSON document by URL.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Value, LoaderError>;
}

/// HTTP(S) fetcher backed by reqwest.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client (proxies, timeouts, TLS roots).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Value, LoaderError> {
        let parsed = Url::parse(url)
            .map_err(|e| LoaderError::Configuration(format!("invalid URL {url:?}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(LoaderError::unresolvable(
                url,
                format!("unsupported scheme {}", parsed.scheme()),
            ));
        }

        tracing::debug!(url = url, "fetching remote document");
        let response = self
            .client
            .get(parsed)
            .header(ACCEPT, ACCEPT_JSON_LD)
            .send()
            .await
            .map_err(|e| LoaderError::unresolvable_with(url, "request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoaderError::unresolvable(url, format!("HTTP {status}")));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| LoaderError::unresolvable_with(url, "response is not JSON", e))
    }
}

/// Fetcher that refuses every request. Used when network access is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineFetcher;

#[async_trait]
impl DocumentFetcher for OfflineFetcher {
    async fn fetch(&self, url: &str) -> Result<Value, LoaderError> {
        Err(LoaderError::unresolvable(url, "network access is disabled"))
    }
}

/// Fetcher serving a fixed set of documents. Useful for tests and for
/// air-gapped deployments that mirror remote documents locally.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    documents: HashMap<String, Value>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, url: impl Into<String>, document: Value) -> Self {
        self.documents.insert(url.into(), document);
        self
    }
}

#[async_trait]
impl DocumentFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Value, LoaderError> {
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| LoaderError::unresolvable(url, "HTTP 404 Not Found"))
    }
}
