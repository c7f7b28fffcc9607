use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome for a single proof.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofResult {
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<String>,
    pub proof: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of verifying a credential or presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub verified: bool,
    #[serde(default)]
    pub results: Vec<ProofResult>,
    /// Per-credential outcomes; presentations only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_results: Option<Vec<CredentialResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerificationResult {
    /// Aggregate per-proof results: verified when at least one proof verified.
    pub fn from_proofs(results: Vec<ProofResult>) -> Self {
        let verified = results.iter().any(|r| r.verified);
        let error = if verified {
            None
        } else if results.is_empty() {
            Some("no matching proofs found".to_string())
        } else {
            results
                .iter()
                .find_map(|r| r.error.clone())
                .or_else(|| Some("signature verification failed".to_string()))
        };
        Self {
            verified,
            results,
            credential_results: None,
            error,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            verified: false,
            results: Vec::new(),
            credential_results: None,
            error: Some(error.into()),
        }
    }
}

/// Outcome for one credential embedded in a presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub result: VerificationResult,
}
