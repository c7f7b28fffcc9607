//! Issuer membership: which issuers a verifier trusts.
//!
//! Membership is orthogonal to cryptographic verification; a credential can
//! verify and still come from an issuer outside the registry.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use vcsign_ldp::{credential_issuer, presentation_credentials};
use vcsign_loader::DocumentFetcher;

use crate::error::ServiceError;

/// Well-known location of the Digital Credentials Consortium issuer registry.
pub const DEFAULT_REGISTRY_URL: &str =
    "https://digitalcredentials.github.io/issuer-registry/registry.json";

/// Issuer DID → membership metadata. Only used as a set.
///
/// Deserializes from the same shapes as [`from_value`](Self::from_value).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IssuerMembershipRegistry {
    members: BTreeMap<String, Value>,
}

impl IssuerMembershipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(mut self, issuer: impl Into<String>, metadata: Value) -> Self {
        self.insert(issuer, metadata);
        self
    }

    pub fn insert(&mut self, issuer: impl Into<String>, metadata: Value) {
        self.members.insert(issuer.into(), metadata);
    }

    /// Parse a registry from either a bare `{ issuer: metadata }` map or the
    /// published `{ "registry": ... }` envelope. The envelope's `registry`
    /// member may itself be a JSON-encoded string.
    pub fn from_value(value: Value) -> Result<Self, ServiceError> {
        let Value::Object(mut map) = value else {
            return Err(ServiceError::Configuration(
                "issuer registry must be a JSON object".into(),
            ));
        };

        let members = match map.remove("registry") {
            Some(Value::Object(inner)) => inner,
            Some(Value::String(encoded)) => match serde_json::from_str::<Value>(&encoded)? {
                Value::Object(inner) => inner,
                _ => {
                    return Err(ServiceError::Configuration(
                        "encoded issuer registry is not a JSON object".into(),
                    ))
                }
            },
            Some(other) => {
                map.insert("registry".into(), other);
                map
            }
            None => map,
        };

        Ok(Self {
            members: members.into_iter().collect(),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, ServiceError> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Fetch and parse a published registry.
    pub async fn fetch(url: &str, fetcher: &dyn DocumentFetcher) -> Result<Self, ServiceError> {
        let document = fetcher.fetch(url).await?;
        let registry = Self::from_value(document)?;
        tracing::info!(url = url, issuers = registry.len(), "issuer registry fetched");
        Ok(registry)
    }

    pub fn contains(&self, issuer: &str) -> bool {
        self.members.contains_key(issuer)
    }

    pub fn get(&self, issuer: &str) -> Option<&Value> {
        self.members.get(issuer)
    }

    pub fn issuers(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<'de> Deserialize<'de> for IssuerMembershipRegistry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(serde::de::Error::custom)
    }
}

/// Decides whether the issuers of a credential or presentation are members
/// of a registry. Injected into [`VerifierService`](crate::VerifierService).
pub trait IssuerMembershipValidator: Send + Sync {
    fn validate_credential(&self, credential: &Value, registry: &IssuerMembershipRegistry) -> bool;

    /// A presentation without credentials is valid. Otherwise every embedded
    /// credential is evaluated and all must be valid.
    fn validate_presentation(
        &self,
        presentation: &Value,
        registry: &IssuerMembershipRegistry,
    ) -> bool {
        let outcomes: Vec<bool> = presentation_credentials(presentation)
            .into_iter()
            .map(|credential| self.validate_credential(credential, registry))
            .collect();
        outcomes.into_iter().all(|valid| valid)
    }
}

/// Registry lookup of the credential issuer (bare DID or `issuer.id`).
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistryMembershipValidator;

impl IssuerMembershipValidator for RegistryMembershipValidator {
    fn validate_credential(&self, credential: &Value, registry: &IssuerMembershipRegistry) -> bool {
        match credential_issuer(credential) {
            Some(issuer) if registry.contains(issuer) => true,
            Some(issuer) => {
                tracing::debug!(issuer = issuer, "issuer not in membership registry");
                false
            }
            None => {
                tracing::debug!("credential has no issuer");
                false
            }
        }
    }
}
