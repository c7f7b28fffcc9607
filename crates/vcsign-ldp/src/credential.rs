//! Issue and verify verifiable credentials.

use chrono::DateTime;
use serde_json::Value;
use vcsign_core::ProofPurpose;
use vcsign_loader::contexts::CREDENTIALS_V1_URL;
use vcsign_loader::DocumentLoader;

use crate::error::LdpError;
use crate::proof::{resolve_contexts, sign_document, verify_proofs};
use crate::purpose::Purpose;
use crate::result::VerificationResult;
use crate::suite::SigningSuite;

/// The issuer DID of a credential: a bare identifier or an object's `id`.
pub fn credential_issuer(credential: &Value) -> Option<&str> {
    match credential.get("issuer")? {
        Value::String(issuer) => Some(issuer),
        Value::Object(issuer) => issuer.get("id").and_then(Value::as_str),
        _ => None,
    }
}

/// Check the credential data model: VC v1 context first, a
/// `VerifiableCredential` type, an issuer, an RFC 3339 `issuanceDate` and a
/// `credentialSubject`.
pub fn validate_credential(credential: &Value) -> Result<(), LdpError> {
    let invalid = |reason: &str| Err(LdpError::InvalidCredential(reason.to_string()));

    if !credential.is_object() {
        return invalid("credential must be a JSON object");
    }
    if first_context(credential) != Some(CREDENTIALS_V1_URL) {
        return invalid("first @context must be https://www.w3.org/2018/credentials/v1");
    }
    if !has_type(credential, "VerifiableCredential") {
        return invalid("type must include VerifiableCredential");
    }
    match credential_issuer(credential) {
        Some(issuer) if issuer.contains(':') => {}
        Some(_) => return invalid("issuer must be a URI"),
        None => return invalid("issuer is required"),
    }
    for field in ["issuanceDate", "expirationDate"] {
        match credential.get(field) {
            Some(Value::String(date)) => {
                DateTime::parse_from_rfc3339(date).map_err(|e| {
                    LdpError::InvalidCredential(format!("{field} {date:?} is not a valid date: {e}"))
                })?;
            }
            Some(_) => return invalid(&format!("{field} must be a string")),
            None if field == "issuanceDate" => return invalid("issuanceDate is required"),
            None => {}
        }
    }
    if credential.get("credentialSubject").is_none() {
        return invalid("credentialSubject is required");
    }
    Ok(())
}

/// Sign a credential, returning a new credential with the proof attached.
pub async fn issue(
    credential: &Value,
    suite: &SigningSuite,
    purpose: &Purpose,
    loader: &DocumentLoader,
) -> Result<Value, LdpError> {
    validate_credential(credential)?;
    sign_document(credential, suite, purpose, loader).await
}

/// Verify a credential's proofs.
///
/// For assertion proofs the signing key's controller must be the credential
/// issuer.
pub async fn verify_credential(
    credential: &Value,
    expected_verification_method: Option<&str>,
    purpose: &Purpose,
    loader: &DocumentLoader,
) -> Result<VerificationResult, LdpError> {
    validate_credential(credential)?;
    resolve_contexts(credential, loader).await?;

    let purpose = match credential_issuer(credential) {
        Some(issuer) if purpose.purpose() == ProofPurpose::AssertionMethod => {
            purpose.clone().with_controller(issuer)
        }
        _ => purpose.clone(),
    };

    let result = verify_proofs(credential, expected_verification_method, &purpose, loader).await?;
    let id = credential.get("id").and_then(Value::as_str).unwrap_or_default();
    tracing::debug!(
        id = id,
        verified = result.verified,
        "credential verified"
    );
    Ok(result)
}

pub(crate) fn first_context(document: &Value) -> Option<&str> {
    match document.get("@context")? {
        Value::String(url) => Some(url),
        Value::Array(entries) => entries.first().and_then(Value::as_str),
        _ => None,
    }
}

pub(crate) fn has_type(document: &Value, expected: &str) -> bool {
    match document.get("type") {
        Some(Value::String(t)) => t == expected,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(expected)),
        _ => false,
    }
}
