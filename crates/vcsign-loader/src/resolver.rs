//! DID method resolver seam and dispatch by registered pattern.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use vcsign_core::get_controller;

use crate::contexts::{ED25519_2020_V1_URL, JWS_2020_V1_URL};
use crate::error::LoaderError;

/// Resolves a DID or DID URL to a JSON document.
///
/// For a bare DID the result is the DID document; for a DID URL with a
/// fragment it is the referenced key node.
#[async_trait]
pub trait DidMethodResolver: Send + Sync {
    async fn resolve(&self, url: &str) -> Result<Value, LoaderError>;
}

/// Resolvers keyed by match string.
///
/// Lookup order: exact match on the full URL, then exact match on the DID
/// (fragment stripped), then the longest registered prefix of the URL.
#[derive(Clone, Default)]
pub struct ResolverRegistry {
    resolvers: Vec<(String, Arc<dyn DidMethodResolver>)>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resolver. Re-registering a pattern replaces the previous one.
    pub fn register(&mut self, pattern: impl Into<String>, resolver: Arc<dyn DidMethodResolver>) {
        let pattern = pattern.into();
        match self.resolvers.iter_mut().find(|(p, _)| *p == pattern) {
            Some(entry) => entry.1 = resolver,
            None => self.resolvers.push((pattern, resolver)),
        }
    }

    /// Find the resolver responsible for `url`, with the pattern that matched.
    pub fn lookup(&self, url: &str) -> Option<(&str, &Arc<dyn DidMethodResolver>)> {
        let find_exact = |needle: &str| {
            self.resolvers
                .iter()
                .find(|(p, _)| p == needle)
                .map(|(p, r)| (p.as_str(), r))
        };

        find_exact(url)
            .or_else(|| find_exact(get_controller(url)))
            .or_else(|| {
                self.resolvers
                    .iter()
                    .filter(|(p, _)| !p.is_empty() && url.starts_with(p.as_str()))
                    .max_by_key(|(p, _)| p.len())
                    .map(|(p, r)| (p.as_str(), r))
            })
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

impl std::fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.resolvers.iter().map(|(p, _)| p))
            .finish()
    }
}

/// Find the key node `url` refers to inside a DID document.
///
/// Searches `verificationMethod` and every relationship carrying embedded
/// keys; relative ids (`#key-1`) are matched against the fragment and made
/// absolute in the returned node.
pub fn select_key_node(document: &Value, url: &str) -> Result<Value, LoaderError> {
    let fragment = url
        .split_once('#')
        .map(|(_, f)| format!("#{f}"))
        .ok_or_else(|| LoaderError::Configuration(format!("{url} has no key fragment")))?;

    let candidates = [
        "verificationMethod",
        "assertionMethod",
        "authentication",
        "capabilityInvocation",
        "capabilityDelegation",
        "keyAgreement",
        "publicKey",
    ];

    let node = candidates
        .iter()
        .filter_map(|name| document.get(*name).and_then(Value::as_array))
        .flatten()
        .filter(|entry| entry.is_object())
        .find(|entry| {
            entry
                .get("id")
                .and_then(Value::as_str)
                .is_some_and(|id| id == url || id == fragment)
        })
        .ok_or_else(|| LoaderError::unresolvable(url, "key not found in DID document"))?;

    let mut node = node.clone();
    if let Some(obj) = node.as_object_mut() {
        obj.insert("id".into(), Value::String(url.to_string()));
        obj.entry("controller")
            .or_insert_with(|| Value::String(get_controller(url).to_string()));
    }
    Ok(wrap_key_node(node))
}

/// Give a key node the suite context matching its type, unless it already
/// carries one.
pub fn wrap_key_node(node: Value) -> Value {
    let mut obj = match node {
        Value::Object(obj) => obj,
        other => return other,
    };
    if !obj.contains_key("@context") {
        let context = match obj.get("type").and_then(Value::as_str) {
            Some("JsonWebKey2020") => JWS_2020_V1_URL,
            _ => ED25519_2020_V1_URL,
        };
        let mut wrapped = Map::new();
        wrapped.insert("@context".into(), json!(context));
        wrapped.extend(obj);
        obj = wrapped;
    }
    Value::Object(obj)
}
