//! Proof purposes: what a proof asserts, and the checks a verifier runs
//! against the proof and the key's controller.

use serde_json::{Map, Value};
use vcsign_core::{get_controller, get_proof_property_str, CoreError, ProofOptions, ProofPurpose};
use vcsign_loader::DocumentLoader;

use crate::error::LdpError;

/// Outcome of a purpose check. Mismatches are not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurposeOutcome {
    Valid,
    Invalid(String),
}

/// A proof purpose together with the values bound into the proof.
///
/// When signing, the purpose, challenge and domain are written into the
/// proof. When verifying they are expected values; `controller`, when set,
/// additionally pins the key's controller (the credential issuer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purpose {
    purpose: ProofPurpose,
    challenge: Option<String>,
    domain: Option<String>,
    controller: Option<String>,
}

impl Purpose {
    pub fn new(purpose: ProofPurpose) -> Self {
        Self {
            purpose,
            challenge: None,
            domain: None,
            controller: None,
        }
    }

    pub fn assertion_method() -> Self {
        Self::new(ProofPurpose::AssertionMethod)
    }

    pub fn authentication(challenge: impl Into<String>) -> Self {
        Self::new(ProofPurpose::Authentication).with_challenge(challenge)
    }

    /// Purpose, challenge and domain as given in the options.
    pub fn from_options(options: &ProofOptions) -> Self {
        Self {
            purpose: options.proof_purpose(),
            challenge: options.challenge().map(str::to_string),
            domain: options.domain().map(str::to_string),
            controller: None,
        }
    }

    pub fn with_challenge(mut self, challenge: impl Into<String>) -> Self {
        self.challenge = Some(challenge.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_controller(mut self, controller: impl Into<String>) -> Self {
        self.controller = Some(controller.into());
        self
    }

    pub fn purpose(&self) -> ProofPurpose {
        self.purpose
    }

    pub fn challenge(&self) -> Option<&str> {
        self.challenge.as_deref()
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Authentication proofs are only meaningful with a challenge.
    pub(crate) fn ensure_challenge(&self) -> Result<(), LdpError> {
        if self.purpose == ProofPurpose::Authentication && self.challenge.is_none() {
            return Err(LdpError::Configuration(
                "a challenge is required for authentication proofs".into(),
            ));
        }
        Ok(())
    }

    /// Write purpose, challenge and domain into a proof being created.
    pub(crate) fn embed(&self, proof: &mut Map<String, Value>) {
        proof.insert("proofPurpose".into(), Value::from(self.purpose.as_str()));
        if let Some(ref challenge) = self.challenge {
            proof.insert("challenge".into(), Value::from(challenge.as_str()));
        }
        if let Some(ref domain) = self.domain {
            proof.insert("domain".into(), Value::from(domain.as_str()));
        }
    }

    /// Check a proof against this purpose.
    ///
    /// `key` is the dereferenced verification method. Its controller's DID
    /// document is loaded and must list the key under the purpose's
    /// relationship.
    pub async fn validate(
        &self,
        proof: &Value,
        key: &Value,
        loader: &DocumentLoader,
    ) -> Result<PurposeOutcome, LdpError> {
        self.ensure_challenge()?;

        let proof_purpose = get_proof_property_str(proof, "proofPurpose")?;
        if proof_purpose != self.purpose.as_str() {
            return Ok(PurposeOutcome::Invalid(format!(
                "proof purpose {proof_purpose} does not match expected {}",
                self.purpose
            )));
        }

        if let Some(ref expected) = self.challenge {
            match optional_property(proof, "challenge")? {
                Some(ref actual) if actual == expected => {}
                _ => return Ok(PurposeOutcome::Invalid("challenge does not match".into())),
            }
        }
        if let Some(ref expected) = self.domain {
            match optional_property(proof, "domain")? {
                Some(ref actual) if actual == expected => {}
                _ => return Ok(PurposeOutcome::Invalid("domain does not match".into())),
            }
        }

        let (key_id, controller) = key_identity(key)?;

        if let Some(ref expected) = self.controller {
            if expected != controller {
                return Ok(PurposeOutcome::Invalid(format!(
                    "{expected} is not the controller of {key_id}"
                )));
            }
        }

        if self.is_authorized(key, loader).await? {
            Ok(PurposeOutcome::Valid)
        } else {
            Ok(PurposeOutcome::Invalid(format!(
                "{key_id} is not authorized for {} by {controller}",
                self.purpose
            )))
        }
    }
}

impl Purpose {
    /// Whether the controller's DID document lists `key` (a dereferenced
    /// verification method) under this purpose's relationship.
    pub async fn is_authorized(&self, key: &Value, loader: &DocumentLoader) -> Result<bool, LdpError> {
        let (key_id, controller) = key_identity(key)?;
        let controller_doc = loader.document(controller).await?;
        Ok(lists_key(&controller_doc, self.purpose.as_str(), controller, key_id))
    }
}

fn key_identity(key: &Value) -> Result<(&str, &str), LdpError> {
    let key_id = key
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| LdpError::MalformedProof("verification method has no id".into()))?;
    let controller = key
        .get("controller")
        .and_then(Value::as_str)
        .unwrap_or_else(|| get_controller(key_id));
    Ok((key_id, controller))
}

fn optional_property(proof: &Value, name: &str) -> Result<Option<String>, LdpError> {
    match get_proof_property_str(proof, name) {
        Ok(value) => Ok(Some(value)),
        Err(CoreError::InvalidProofProperty(ref p)) if p == name => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn lists_key(document: &Value, relationship: &str, controller: &str, key_id: &str) -> bool {
    let Some(entries) = document.get(relationship).and_then(Value::as_array) else {
        return false;
    };
    entries.iter().any(|entry| {
        let id = match entry {
            Value::String(id) => Some(id.as_str()),
            Value::Object(obj) => obj.get("id").and_then(Value::as_str),
            _ => None,
        };
        match id {
            Some(id) if id.starts_with('#') => format!("{controller}{id}") == key_id,
            Some(id) => id == key_id,
            None => false,
        }
    })
}
