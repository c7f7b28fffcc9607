//! Proof creation and proof-set verification shared by credentials and
//! presentations.
//!
//! The signed bytes are `sha256(C(proof options)) ‖ sha256(C(document))`,
//! where `C` is JSON canonicalization, the proof options are the proof
//! without its signature member plus the document's `@context`, and the
//! document is taken without any `proof`.

use serde_json::{Map, Value};
use vcsign_core::{canonicalize, get_proof_property_str};
use vcsign_crypto::sha256;
use vcsign_loader::DocumentLoader;

use crate::error::LdpError;
use crate::purpose::{Purpose, PurposeOutcome};
use crate::result::{ProofResult, VerificationResult};
use crate::suite::{public_key_from_node, SigningSuite, SuiteKind};

const SIGNATURE_MEMBERS: [&str; 2] = ["proofValue", "jws"];

/// Bytes covered by the signature of `proof` over `document`.
pub fn create_verify_data(document: &Value, proof: &Value) -> Result<Vec<u8>, LdpError> {
    let mut unsigned = object(document, "document")?.clone();
    unsigned.remove("proof");

    let mut options = object(proof, "proof")?.clone();
    for member in SIGNATURE_MEMBERS {
        options.remove(member);
    }
    match unsigned.get("@context") {
        Some(context) => options.insert("@context".into(), context.clone()),
        None => options.remove("@context"),
    };

    let mut data = Vec::with_capacity(64);
    data.extend_from_slice(&sha256(&canonicalize(&Value::Object(options))?));
    data.extend_from_slice(&sha256(&canonicalize(&Value::Object(unsigned))?));
    Ok(data)
}

/// Sign a copy of `document`: the suite context is added, every context is
/// dereferenced through the loader, and the new proof is appended to any
/// existing ones.
pub async fn sign_document(
    document: &Value,
    suite: &SigningSuite,
    purpose: &Purpose,
    loader: &DocumentLoader,
) -> Result<Value, LdpError> {
    let mut signed = document.clone();
    add_context(&mut signed, suite.kind.suite().context_url())?;
    resolve_contexts(&signed, loader).await?;

    let proof = create_proof(&signed, suite, purpose)?;
    attach_proof(&mut signed, proof)?;

    tracing::debug!(
        proof_type = %suite.kind,
        verification_method = %suite.verification_method,
        purpose = %purpose.purpose(),
        "proof created"
    );
    Ok(signed)
}

/// Build and sign a proof for `document` (which must already carry its
/// final `@context`).
pub fn create_proof(document: &Value, suite: &SigningSuite, purpose: &Purpose) -> Result<Value, LdpError> {
    let signature_suite = suite.kind.suite();

    let mut proof = Map::new();
    proof.insert("type".into(), Value::from(signature_suite.proof_type()));
    proof.insert("created".into(), Value::from(suite.created.as_str()));
    proof.insert(
        "verificationMethod".into(),
        Value::from(suite.verification_method.as_str()),
    );
    purpose.embed(&mut proof);

    let mut proof = Value::Object(proof);
    let verify_data = create_verify_data(document, &proof)?;
    let signature = signature_suite.sign(&verify_data, &suite.key)?;
    if let Some(obj) = proof.as_object_mut() {
        obj.insert(signature_suite.signature_property().into(), Value::from(signature));
    }
    Ok(proof)
}

/// Verify every supported proof on `document`.
///
/// Proofs of unknown type, and proofs whose verification method differs from
/// `expected_verification_method` when one is given, are ignored. The result
/// is verified when at least one remaining proof verifies.
pub async fn verify_proofs(
    document: &Value,
    expected_verification_method: Option<&str>,
    purpose: &Purpose,
    loader: &DocumentLoader,
) -> Result<VerificationResult, LdpError> {
    let mut results = Vec::new();

    for proof in proofs_of(document) {
        let Some(kind) = proof
            .get("type")
            .and_then(Value::as_str)
            .and_then(SuiteKind::from_proof_type)
        else {
            tracing::debug!(proof_type = %proof["type"], "skipping proof of unsupported type");
            continue;
        };

        let verification_method = get_proof_property_str(proof, "verificationMethod")?;
        if let Some(expected) = expected_verification_method {
            if verification_method != expected {
                tracing::debug!(
                    verification_method = %verification_method,
                    expected = %expected,
                    "skipping proof made with another key"
                );
                continue;
            }
        }

        results.push(verify_proof(document, proof, kind, verification_method, purpose, loader).await?);
    }

    Ok(VerificationResult::from_proofs(results))
}

async fn verify_proof(
    document: &Value,
    proof: &Value,
    kind: SuiteKind,
    verification_method: String,
    purpose: &Purpose,
    loader: &DocumentLoader,
) -> Result<ProofResult, LdpError> {
    let key = loader.document(&verification_method).await?;
    let public_key = public_key_from_node(&key)?;

    if let PurposeOutcome::Invalid(reason) = purpose.validate(proof, &key, loader).await? {
        return Ok(ProofResult {
            verified: false,
            verification_method: Some(verification_method),
            proof: proof.clone(),
            error: Some(reason),
        });
    }

    let suite = kind.suite();
    let signature = proof
        .get(suite.signature_property())
        .and_then(Value::as_str)
        .ok_or_else(|| {
            LdpError::MalformedProof(format!(
                "{} proof has no {}",
                suite.proof_type(),
                suite.signature_property()
            ))
        })?;

    let verify_data = create_verify_data(document, proof)?;
    let verified = suite.verify(&verify_data, signature, &public_key)?;

    Ok(ProofResult {
        verified,
        verification_method: Some(verification_method),
        proof: proof.clone(),
        error: (!verified).then(|| "signature verification failed".to_string()),
    })
}

/// Dereference every string `@context` entry, failing on the first one the
/// loader cannot produce.
pub async fn resolve_contexts(document: &Value, loader: &DocumentLoader) -> Result<(), LdpError> {
    let urls: Vec<&str> = match document.get("@context") {
        Some(Value::String(url)) => vec![url.as_str()],
        Some(Value::Array(entries)) => entries.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };
    for url in urls {
        loader.resolve(url).await?;
    }
    Ok(())
}

fn add_context(document: &mut Value, url: &str) -> Result<(), LdpError> {
    let obj = document
        .as_object_mut()
        .ok_or_else(|| LdpError::Configuration("document must be a JSON object".into()))?;
    match obj.get_mut("@context") {
        Some(Value::Array(entries)) => {
            if !entries.iter().any(|e| e.as_str() == Some(url)) {
                entries.push(Value::from(url));
            }
        }
        Some(existing) => {
            if existing.as_str() != Some(url) {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::from(url)]);
            }
        }
        None => {
            obj.insert("@context".into(), Value::from(url));
        }
    }
    Ok(())
}

fn attach_proof(document: &mut Value, proof: Value) -> Result<(), LdpError> {
    let obj = document
        .as_object_mut()
        .ok_or_else(|| LdpError::Configuration("document must be a JSON object".into()))?;
    match obj.remove("proof") {
        None => obj.insert("proof".into(), proof),
        Some(Value::Array(mut proofs)) => {
            proofs.push(proof);
            obj.insert("proof".into(), Value::Array(proofs))
        }
        Some(existing) => obj.insert("proof".into(), Value::Array(vec![existing, proof])),
    };
    Ok(())
}

fn proofs_of(document: &Value) -> Vec<&Value> {
    match document.get("proof") {
        Some(Value::Array(proofs)) => proofs.iter().collect(),
        Some(proof @ Value::Object(_)) => vec![proof],
        _ => Vec::new(),
    }
}

fn object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>, LdpError> {
    value
        .as_object()
        .ok_or_else(|| LdpError::Configuration(format!("{what} must be a JSON object")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_verify_data_ignores_signature_and_proof() {
        let document = json!({"@context": "https://www.w3.org/2018/credentials/v1", "a": 1});
        let proof = json!({"type": "Ed25519Signature2020", "created": "2021-01-01T00:00:00Z"});

        let base = create_verify_data(&document, &proof).unwrap();
        assert_eq!(base.len(), 64);

        let mut signed_proof = proof.clone();
        signed_proof["proofValue"] = json!("z123");
        let mut with_proof = document.clone();
        with_proof["proof"] = signed_proof.clone();
        assert_eq!(create_verify_data(&with_proof, &signed_proof).unwrap(), base);
    }

    #[test]
    fn test_verify_data_covers_document_and_options() {
        let document = json!({"@context": "https://www.w3.org/2018/credentials/v1", "a": 1});
        let proof = json!({"type": "Ed25519Signature2020", "created": "2021-01-01T00:00:00Z"});
        let base = create_verify_data(&document, &proof).unwrap();

        let changed_doc = json!({"@context": "https://www.w3.org/2018/credentials/v1", "a": 2});
        assert_ne!(create_verify_data(&changed_doc, &proof).unwrap(), base);

        let changed_proof = json!({"type": "Ed25519Signature2020", "created": "2022-01-01T00:00:00Z"});
        assert_ne!(create_verify_data(&document, &changed_proof).unwrap(), base);
    }

    #[test]
    fn test_verify_data_key_order_independent() {
        let a = json!({"x": 1, "y": {"b": 2, "a": 1}});
        let b = json!({"y": {"a": 1, "b": 2}, "x": 1});
        let proof = json!({"type": "Ed25519Signature2020"});
        assert_eq!(
            create_verify_data(&a, &proof).unwrap(),
            create_verify_data(&b, &proof).unwrap()
        );
    }

    #[test]
    fn test_add_context() {
        let mut doc = json!({"@context": "https://www.w3.org/2018/credentials/v1"});
        add_context(&mut doc, "https://w3id.org/security/suites/ed25519-2020/v1").unwrap();
        assert_eq!(
            doc["@context"],
            json!([
                "https://www.w3.org/2018/credentials/v1",
                "https://w3id.org/security/suites/ed25519-2020/v1"
            ])
        );
        add_context(&mut doc, "https://w3id.org/security/suites/ed25519-2020/v1").unwrap();
        assert_eq!(doc["@context"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_attach_proof_builds_set() {
        let mut doc = json!({});
        attach_proof(&mut doc, json!({"n": 1})).unwrap();
        assert_eq!(doc["proof"], json!({"n": 1}));
        attach_proof(&mut doc, json!({"n": 2})).unwrap();
        assert_eq!(doc["proof"], json!([{"n": 1}, {"n": 2}]));
        attach_proof(&mut doc, json!({"n": 3})).unwrap();
        assert_eq!(proofs_of(&doc).len(), 3);
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(create_verify_data(&json!([1, 2]), &json!({})).is_err());
        assert!(proofs_of(&json!("x")).is_empty());
    }
}
