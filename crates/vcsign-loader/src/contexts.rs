//! Pinned JSON-LD context documents.
//!
//! Contexts are embedded at build time so that signing and verification never
//! depend on the network for well-known vocabularies.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::LoaderError;

pub const CREDENTIALS_V1_URL: &str = "https://www.w3.org/2018/credentials/v1";
pub const CREDENTIALS_EXAMPLES_V1_URL: &str = "https://www.w3.org/2018/credentials/examples/v1";
pub const SECURITY_V1_URL: &str = "https://w3id.org/security/v1";
pub const SECURITY_V2_URL: &str = "https://w3id.org/security/v2";
pub const ED25519_2020_V1_URL: &str = "https://w3id.org/security/suites/ed25519-2020/v1";
pub const JWS_2020_V1_URL: &str = "https://w3id.org/security/suites/jws-2020/v1";
pub const JWS_2020_LEGACY_URL: &str =
    "https://w3c-ccg.github.io/lds-jws2020/contexts/lds-jws2020-v1.json";
pub const X25519_2020_V1_URL: &str = "https://w3id.org/security/suites/x25519-2020/v1";
pub const DID_V1_URL: &str = "https://www.w3.org/ns/did/v1";
pub const DID_V011_URL: &str = "https://w3id.org/did/v0.11";
pub const DCC_V1_URL: &str = "https://w3id.org/dcc/v1";

const CREDENTIALS_V1: &str = include_str!("../contexts/credentials-v1.jsonld");
const CREDENTIALS_EXAMPLES_V1: &str = include_str!("../contexts/credentials-examples-v1.jsonld");
const SECURITY_V1: &str = include_str!("../contexts/security-v1.jsonld");
const SECURITY_V2: &str = include_str!("../contexts/security-v2.jsonld");
const ED25519_2020_V1: &str = include_str!("../contexts/ed25519-2020-v1.jsonld");
const JWS_2020_V1: &str = include_str!("../contexts/jws-2020-v1.jsonld");
const X25519_2020_V1: &str = include_str!("../contexts/x25519-2020-v1.jsonld");
const DID_V1: &str = include_str!("../contexts/did-v1.jsonld");
const DID_V011: &str = include_str!("../contexts/did-v0.11.jsonld");
const DCC_V1: &str = include_str!("../contexts/dcc-v1.jsonld");

/// A named group of pinned contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextBundle {
    /// Verifiable Credentials v1 and its examples vocabulary.
    Credentials,
    /// Security vocabularies and the Ed25519 / JWS / X25519 2020 suites.
    Security,
    /// DID core.
    Did,
    /// Digital Credentials Consortium vocabulary.
    Dcc,
}

impl ContextBundle {
    pub const ALL: [ContextBundle; 4] = [
        ContextBundle::Credentials,
        ContextBundle::Security,
        ContextBundle::Did,
        ContextBundle::Dcc,
    ];

    fn entries(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Credentials => &[
                (CREDENTIALS_V1_URL, CREDENTIALS_V1),
                (CREDENTIALS_EXAMPLES_V1_URL, CREDENTIALS_EXAMPLES_V1),
            ],
            Self::Security => &[
                (SECURITY_V1_URL, SECURITY_V1),
                (SECURITY_V2_URL, SECURITY_V2),
                (ED25519_2020_V1_URL, ED25519_2020_V1),
                (JWS_2020_V1_URL, JWS_2020_V1),
                (JWS_2020_LEGACY_URL, JWS_2020_V1),
                (X25519_2020_V1_URL, X25519_2020_V1),
            ],
            Self::Did => &[(DID_V1_URL, DID_V1), (DID_V011_URL, DID_V011)],
            Self::Dcc => &[(DCC_V1_URL, DCC_V1)],
        }
    }
}

/// Map from context URL to context document.
///
/// Registration is last-write-wins. A registry is assembled completely before
/// it is handed to a loader and is never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct ContextRegistry {
    contexts: HashMap<String, Value>,
}

impl ContextRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded from the given bundles.
    pub fn build(bundles: &[ContextBundle]) -> Result<Self, LoaderError> {
        let mut registry = Self::new();
        for bundle in bundles {
            for (url, raw) in bundle.entries() {
                let doc: Value = serde_json::from_str(raw).map_err(|e| {
                    LoaderError::Configuration(format!("embedded context {url} is not JSON: {e}"))
                })?;
                registry = registry.add_context(*url, doc);
            }
        }
        Ok(registry)
    }

    /// Registry seeded from every bundle.
    pub fn with_defaults() -> Result<Self, LoaderError> {
        Self::build(&ContextBundle::ALL)
    }

    /// Register or overwrite a context.
    pub fn add_context(mut self, url: impl Into<String>, document: Value) -> Self {
        self.contexts.insert(url.into(), document);
        self
    }

    pub fn get(&self, url: &str) -> Option<&Value> {
        self.contexts.get(url)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.contexts.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.contexts.keys().map(String::as_str)
    }

    pub(crate) fn merge(&mut self, other: ContextRegistry) {
        self.contexts.extend(other.contexts);
    }
}
