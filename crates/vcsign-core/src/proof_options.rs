use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::did::DidUrl;
use crate::error::CoreError;

/// Proof purpose used when a caller does not name one.
pub const DEFAULT_PROOF_PURPOSE: ProofPurpose = ProofPurpose::AssertionMethod;

/// The authorized use of a key for a given proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProofPurpose {
    #[default]
    AssertionMethod,
    Authentication,
    CapabilityInvocation,
    CapabilityDelegation,
}

impl ProofPurpose {
    /// The term as it appears in `proofPurpose` and as the DID document
    /// relationship name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AssertionMethod => "assertionMethod",
            Self::Authentication => "authentication",
            Self::CapabilityInvocation => "capabilityInvocation",
            Self::CapabilityDelegation => "capabilityDelegation",
        }
    }
}

impl fmt::Display for ProofPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProofPurpose {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assertionMethod" => Ok(Self::AssertionMethod),
            "authentication" => Ok(Self::Authentication),
            "capabilityInvocation" => Ok(Self::CapabilityInvocation),
            "capabilityDelegation" => Ok(Self::CapabilityDelegation),
            other => Err(CoreError::Configuration(format!(
                "unknown proof purpose: {other}"
            ))),
        }
    }
}

/// Signing and verification parameters for one sign/verify call.
///
/// Built through [`ProofOptionsBuilder`] or deserialized; both paths validate
/// the fields, and the value is immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawProofOptions")]
pub struct ProofOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    verification_method: Option<String>,
    proof_purpose: ProofPurpose,
    #[serde(skip_serializing_if = "Option::is_none")]
    created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    challenge: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawProofOptions {
    verification_method: Option<String>,
    #[serde(default)]
    proof_purpose: ProofPurpose,
    created: Option<String>,
    domain: Option<String>,
    challenge: Option<String>,
}

impl TryFrom<RawProofOptions> for ProofOptions {
    type Error = CoreError;

    fn try_from(raw: RawProofOptions) -> Result<Self, Self::Error> {
        if let Some(ref vm) = raw.verification_method {
            validate_verification_method(vm)?;
        }
        if let Some(ref created) = raw.created {
            DateTime::parse_from_rfc3339(created).map_err(|e| {
                CoreError::Configuration(format!("invalid created date {created:?}: {e}"))
            })?;
        }
        Ok(Self {
            verification_method: raw.verification_method,
            proof_purpose: raw.proof_purpose,
            created: raw.created,
            domain: raw.domain,
            challenge: raw.challenge,
        })
    }
}

fn validate_verification_method(vm: &str) -> Result<(), CoreError> {
    let url = DidUrl::parse(vm)
        .map_err(|e| CoreError::Configuration(format!("invalid verification method: {e}")))?;
    if url.fragment().is_none() {
        return Err(CoreError::Configuration(format!(
            "verification method must carry a key fragment: {vm}"
        )));
    }
    Ok(())
}

impl ProofOptions {
    /// Start building options.
    pub fn builder() -> ProofOptionsBuilder {
        ProofOptionsBuilder::default()
    }

    /// Options that only name a verification method.
    pub fn for_verification_method(vm: impl Into<String>) -> Result<Self, CoreError> {
        Self::builder().verification_method(vm).build()
    }

    pub fn verification_method(&self) -> Option<&str> {
        self.verification_method.as_deref()
    }

    pub fn proof_purpose(&self) -> ProofPurpose {
        self.proof_purpose
    }

    pub fn created(&self) -> Option<&str> {
        self.created.as_deref()
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn challenge(&self) -> Option<&str> {
        self.challenge.as_deref()
    }

    /// The key identifier to sign or verify with.
    ///
    /// A verification method is mandatory for any sign or verify operation.
    pub fn signing_key_identifier(&self) -> Result<&str, CoreError> {
        self.verification_method().ok_or_else(|| {
            CoreError::Configuration("no verification method in proof options".into())
        })
    }

    /// `created` if set, otherwise the current time (ISO-8601, milliseconds, UTC).
    pub fn signing_date(&self) -> String {
        match self.created {
            Some(ref created) => created.clone(),
            None => Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Copy of these options naming a different verification method.
    pub fn with_verification_method(&self, vm: impl Into<String>) -> Result<Self, CoreError> {
        let vm = vm.into();
        validate_verification_method(&vm)?;
        Ok(Self {
            verification_method: Some(vm),
            ..self.clone()
        })
    }

    /// Copy of these options with a different proof purpose.
    pub fn with_proof_purpose(&self, purpose: ProofPurpose) -> Self {
        Self {
            proof_purpose: purpose,
            ..self.clone()
        }
    }
}

/// Builder for [`ProofOptions`].
#[derive(Debug, Clone, Default)]
pub struct ProofOptionsBuilder {
    verification_method: Option<String>,
    proof_purpose: ProofPurpose,
    created: Option<String>,
    domain: Option<String>,
    challenge: Option<String>,
}

impl ProofOptionsBuilder {
    pub fn verification_method(mut self, vm: impl Into<String>) -> Self {
        self.verification_method = Some(vm.into());
        self
    }

    pub fn proof_purpose(mut self, purpose: ProofPurpose) -> Self {
        self.proof_purpose = purpose;
        self
    }

    pub fn created(mut self, created: impl Into<String>) -> Self {
        self.created = Some(created.into());
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn challenge(mut self, challenge: impl Into<String>) -> Self {
        self.challenge = Some(challenge.into());
        self
    }

    /// Validate and produce the options.
    pub fn build(self) -> Result<ProofOptions, CoreError> {
        ProofOptions::try_from(RawProofOptions {
            verification_method: self.verification_method,
            proof_purpose: self.proof_purpose,
            created: self.created,
            domain: self.domain,
            challenge: self.challenge,
        })
    }
}
