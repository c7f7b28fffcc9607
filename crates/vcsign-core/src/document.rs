use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::did::{get_controller, DidUrl};
use crate::error::CoreError;

/// A verification key inside a DID document.
///
/// Unlocked (signing-capable) documents carry `privateKeyMultibase`;
/// public documents omit it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationKey {
    /// Key identifier (`<controller>#<fragment>`).
    pub id: String,
    /// Key type (e.g. "Ed25519VerificationKey2020").
    #[serde(rename = "type")]
    pub key_type: String,
    /// The DID that controls this key.
    pub controller: String,
    /// Multibase-encoded public key.
    pub public_key_multibase: String,
    /// Multibase-encoded private key, present only on unlocked documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_multibase: Option<String>,
}

impl VerificationKey {
    /// Whether this key carries private key material.
    pub fn is_unlocked(&self) -> bool {
        self.private_key_multibase.is_some()
    }

    /// Copy of this key with private material removed.
    pub fn public_view(&self) -> Self {
        Self {
            private_key_multibase: None,
            ..self.clone()
        }
    }
}

/// An entry of a verification relationship (`assertionMethod`,
/// `authentication`, ...): either an embedded key or a reference to an entry
/// of `verificationMethod`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VerificationRelationship {
    Reference(String),
    Embedded(VerificationKey),
}

impl VerificationRelationship {
    /// Identifier of the referenced or embedded key.
    pub fn id(&self) -> &str {
        match self {
            Self::Reference(id) => id,
            Self::Embedded(key) => &key.id,
        }
    }

    fn public_view(&self) -> Self {
        match self {
            Self::Reference(id) => Self::Reference(id.clone()),
            Self::Embedded(key) => Self::Embedded(key.public_view()),
        }
    }
}

/// A DID document as loaded from disk or produced by a DID method driver.
///
/// Members this type does not model (`service`, `keyAgreement`, ...) are kept
/// in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    #[serde(rename = "@context")]
    pub context: Value,
    /// The controller DID.
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verification_method: Vec<VerificationKey>,
    #[serde(default)]
    pub assertion_method: Vec<VerificationRelationship>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authentication: Vec<VerificationRelationship>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capability_delegation: Vec<VerificationRelationship>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capability_invocation: Vec<VerificationRelationship>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DidDocument {
    /// Parse a DID document from JSON text.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check the document invariants: `id` is a DID without fragment and
    /// every key identifier is `id` itself or `id#fragment`.
    pub fn validate(&self) -> Result<(), CoreError> {
        let did = DidUrl::parse(&self.id).map_err(|e| {
            CoreError::Configuration(format!("DID document id is not a DID: {e}"))
        })?;
        if did.fragment().is_some() {
            return Err(CoreError::Configuration(format!(
                "DID document id must not carry a fragment: {}",
                self.id
            )));
        }
        for key in self.all_keys() {
            if get_controller(&key.id) != self.id {
                return Err(CoreError::Configuration(format!(
                    "key {} does not belong to document {}",
                    key.id, self.id
                )));
            }
        }
        Ok(())
    }

    /// Look up a key by id in `verificationMethod` and in every embedded
    /// relationship entry.
    pub fn find_key(&self, id: &str) -> Option<&VerificationKey> {
        self.all_keys().into_iter().find(|k| k.id == id)
    }

    /// Keys usable for `assertionMethod`, with references resolved against
    /// `verificationMethod`. Unresolvable references are skipped.
    pub fn assertion_keys(&self) -> Vec<&VerificationKey> {
        self.assertion_method
            .iter()
            .filter_map(|rel| match rel {
                VerificationRelationship::Embedded(key) => Some(key),
                VerificationRelationship::Reference(id) => {
                    let absolute = self.absolute_id(id);
                    self.verification_method.iter().find(|k| k.id == absolute)
                }
            })
            .collect()
    }

    /// Every distinct key the document defines, in document order.
    pub fn all_keys(&self) -> Vec<&VerificationKey> {
        let embedded = [
            &self.assertion_method,
            &self.authentication,
            &self.capability_delegation,
            &self.capability_invocation,
        ]
        .into_iter()
        .flatten()
        .filter_map(|rel| match rel {
            VerificationRelationship::Embedded(key) => Some(key),
            VerificationRelationship::Reference(_) => None,
        });

        let mut keys: Vec<&VerificationKey> = Vec::new();
        for key in self.verification_method.iter().chain(embedded) {
            if !keys.iter().any(|k| k.id == key.id) {
                keys.push(key);
            }
        }
        keys
    }

    /// Copy of the document with every private key removed.
    pub fn public_view(&self) -> Self {
        let strip = |rels: &[VerificationRelationship]| {
            rels.iter()
                .map(VerificationRelationship::public_view)
                .collect::<Vec<_>>()
        };
        Self {
            context: self.context.clone(),
            id: self.id.clone(),
            verification_method: self
                .verification_method
                .iter()
                .map(VerificationKey::public_view)
                .collect(),
            assertion_method: strip(&self.assertion_method),
            authentication: strip(&self.authentication),
            capability_delegation: strip(&self.capability_delegation),
            capability_invocation: strip(&self.capability_invocation),
            extra: self.extra.clone(),
        }
    }

    /// Serialize to a JSON value.
    pub fn to_value(&self) -> Result<Value, CoreError> {
        Ok(serde_json::to_value(self)?)
    }

    fn absolute_id(&self, id: &str) -> String {
        if id.starts_with('#') {
            format!("{}{}", self.id, id)
        } else {
            id.to_string()
        }
    }
}
