//! Create, sign and verify verifiable presentations.

use serde_json::{json, Map, Value};
use vcsign_loader::contexts::CREDENTIALS_V1_URL;
use vcsign_loader::DocumentLoader;

use crate::credential::{first_context, has_type, verify_credential};
use crate::error::LdpError;
use crate::proof::{resolve_contexts, sign_document, verify_proofs};
use crate::purpose::Purpose;
use crate::result::{CredentialResult, VerificationResult};
use crate::suite::SigningSuite;

/// Presentation envelope around `credentials`.
pub fn create_presentation(credentials: &[Value], id: Option<&str>, holder: Option<&str>) -> Value {
    let mut presentation = Map::new();
    presentation.insert("@context".into(), json!([CREDENTIALS_V1_URL]));
    presentation.insert("type".into(), json!(["VerifiablePresentation"]));
    if let Some(id) = id {
        presentation.insert("id".into(), Value::from(id));
    }
    if let Some(holder) = holder {
        presentation.insert("holder".into(), Value::from(holder));
    }
    if !credentials.is_empty() {
        presentation.insert("verifiableCredential".into(), Value::from(credentials.to_vec()));
    }
    Value::Object(presentation)
}

/// Check the presentation data model: VC v1 context first and a
/// `VerifiablePresentation` type.
pub fn validate_presentation(presentation: &Value) -> Result<(), LdpError> {
    if !presentation.is_object() {
        return Err(LdpError::InvalidPresentation("presentation must be a JSON object".into()));
    }
    if first_context(presentation) != Some(CREDENTIALS_V1_URL) {
        return Err(LdpError::InvalidPresentation(
            "first @context must be https://www.w3.org/2018/credentials/v1".into(),
        ));
    }
    if !has_type(presentation, "VerifiablePresentation") {
        return Err(LdpError::InvalidPresentation(
            "type must include VerifiablePresentation".into(),
        ));
    }
    Ok(())
}

/// Credentials embedded in a presentation (`verifiableCredential` as an
/// object or an array).
pub fn presentation_credentials(presentation: &Value) -> Vec<&Value> {
    match presentation.get("verifiableCredential") {
        Some(Value::Array(credentials)) => credentials.iter().collect(),
        Some(credential @ Value::Object(_)) => vec![credential],
        _ => Vec::new(),
    }
}

/// Sign a presentation. Authentication proofs require a challenge.
pub async fn sign_presentation(
    presentation: &Value,
    suite: &SigningSuite,
    purpose: &Purpose,
    loader: &DocumentLoader,
) -> Result<Value, LdpError> {
    validate_presentation(presentation)?;
    purpose.ensure_challenge()?;
    sign_document(presentation, suite, purpose, loader).await
}

/// Verify a presentation's proofs and every embedded credential.
/// Authentication requires an expected challenge.
///
/// The presentation is verified only when its own proofs verify and every
/// credential verifies. Credential failures, including errors, are reported
/// per credential so that all credentials are evaluated.
/// `expected_verification_method` applies to the presentation's own proofs;
/// credentials are checked against whichever key signed them.
pub async fn verify_presentation(
    presentation: &Value,
    expected_verification_method: Option<&str>,
    purpose: &Purpose,
    loader: &DocumentLoader,
) -> Result<VerificationResult, LdpError> {
    validate_presentation(presentation)?;
    purpose.ensure_challenge()?;
    resolve_contexts(presentation, loader).await?;

    let mut result =
        verify_proofs(presentation, expected_verification_method, purpose, loader).await?;

    let mut credential_results = Vec::new();
    for credential in presentation_credentials(presentation) {
        let outcome = verify_credential(
            credential,
            None,
            &Purpose::assertion_method(),
            loader,
        )
        .await
        .unwrap_or_else(|e| VerificationResult::failure(e.to_string()));
        credential_results.push(CredentialResult {
            id: credential.get("id").and_then(Value::as_str).map(str::to_string),
            result: outcome,
        });
    }

    let credentials_verified = credential_results.iter().all(|r| r.result.verified);
    if result.verified && !credentials_verified {
        result.verified = false;
        result.error = credential_results
            .iter()
            .find_map(|r| r.result.error.clone())
            .or_else(|| Some("credential verification failed".to_string()));
    }
    result.credential_results = Some(credential_results);

    let id = presentation.get("id").and_then(Value::as_str).unwrap_or_default();
    tracing::debug!(
        id = id,
        verified = result.verified,
        "presentation verified"
    );
    Ok(result)
}
