//! Integration test: issuer → verifier credential flow across crates.

use serde_json::json;
use vcsign::{
    ErrorKind, IssuerMembershipRegistry, ProofOptions, SuiteKind, VerifyCredentialRequest,
};
use vcsign_integration_tests::{
    flip_signature_byte, offline_issuer, offline_verifier, sample_credential, TestIdentity,
    CREATED,
};

fn options(key_id: &str) -> ProofOptions {
    ProofOptions::builder()
        .verification_method(key_id)
        .created(CREATED)
        .build()
        .unwrap()
}

// =========================================================================
// did:key end to end
// =========================================================================

#[tokio::test]
async fn test_did_key_sign_then_verify_with_same_identifier() {
    let alice = TestIdentity::from_seed(1);
    let issuer = offline_issuer(vec![alice.unlocked_document()]);
    let verifier = offline_verifier();

    let signed = issuer
        .sign(&sample_credential(&alice.did), &options(&alice.key_id))
        .await
        .expect("signing should succeed");

    let proof = &signed["proof"];
    assert_eq!(proof["type"], "Ed25519Signature2020");
    assert_eq!(proof["proofPurpose"], "assertionMethod");
    assert_eq!(proof["verificationMethod"], alice.key_id.as_str());
    assert_eq!(proof["created"], CREATED);
    assert!(proof["proofValue"].as_str().unwrap().starts_with('z'));

    let request = VerifyCredentialRequest::new(signed, IssuerMembershipRegistry::new())
        .with_options(ProofOptions::for_verification_method(alice.key_id.as_str()).unwrap());
    let outcome = verifier.verify(&request).await.unwrap();
    assert!(outcome.verified, "{:?}", outcome.error);
}

#[tokio::test]
async fn test_did_key_verify_with_mismatched_identifier() {
    let alice = TestIdentity::from_seed(2);
    let bob = TestIdentity::from_seed(3);
    let issuer = offline_issuer(vec![alice.unlocked_document()]);

    let signed = issuer
        .sign(&sample_credential(&alice.did), &options(&alice.key_id))
        .await
        .unwrap();

    let request = VerifyCredentialRequest::new(signed, IssuerMembershipRegistry::new())
        .with_options(ProofOptions::for_verification_method(bob.key_id.as_str()).unwrap());
    let outcome = offline_verifier().verify(&request).await.unwrap();
    assert!(!outcome.verified);
}

#[tokio::test]
async fn test_signing_is_deterministic_for_fixed_created() {
    let alice = TestIdentity::from_seed(4);
    let issuer = offline_issuer(vec![alice.unlocked_document()]);
    let credential = sample_credential(&alice.did);

    let first = issuer.sign(&credential, &options(&alice.key_id)).await.unwrap();
    let second = issuer.sign(&credential, &options(&alice.key_id)).await.unwrap();
    assert_eq!(first, second);
}

// =========================================================================
// Membership is independent of cryptographic validity
// =========================================================================

#[tokio::test]
async fn test_unregistered_issuer_verified_but_not_valid() {
    let alice = TestIdentity::from_seed(5);
    let issuer = offline_issuer(vec![alice.unlocked_document()]);
    let signed = issuer
        .sign(&sample_credential(&alice.did), &ProofOptions::default())
        .await
        .unwrap();

    let registry = IssuerMembershipRegistry::new().with_member("did:web:someone.else", json!({}));
    let outcome = offline_verifier()
        .verify(&VerifyCredentialRequest::new(signed, registry))
        .await
        .unwrap();
    assert!(outcome.verified);
    assert!(!outcome.valid);
}

#[tokio::test]
async fn test_flipped_signature_byte_not_verified() {
    let alice = TestIdentity::from_seed(6);
    let issuer = offline_issuer(vec![alice.unlocked_document()]);
    let mut signed = issuer
        .sign(&sample_credential(&alice.did), &ProofOptions::default())
        .await
        .unwrap();
    flip_signature_byte(&mut signed);

    let registry = IssuerMembershipRegistry::new().with_member(alice.did.clone(), json!({}));
    let outcome = offline_verifier()
        .verify(&VerifyCredentialRequest::new(signed, registry))
        .await
        .unwrap();
    assert!(!outcome.verified);
    assert!(outcome.valid);
    assert_eq!(outcome.error.as_deref(), Some("signature verification failed"));
}

#[tokio::test]
async fn test_issuer_object_membership() {
    let alice = TestIdentity::from_seed(7);
    let issuer = offline_issuer(vec![alice.unlocked_document()]);
    let mut credential = sample_credential(&alice.did);
    credential["issuer"] = json!({"id": alice.did, "name": "Alice University"});
    let signed = issuer.sign(&credential, &ProofOptions::default()).await.unwrap();

    let registry = IssuerMembershipRegistry::from_value(json!({
        "registry": {alice.did.clone(): {"name": "Alice University"}}
    }))
    .unwrap();
    let outcome = offline_verifier()
        .verify(&VerifyCredentialRequest::new(signed, registry))
        .await
        .unwrap();
    assert!(outcome.verified && outcome.valid);
}

// =========================================================================
// JsonWebSignature2020
// =========================================================================

#[tokio::test]
async fn test_jws_suite_round_trip() {
    let alice = TestIdentity::from_seed(8);
    let issuer = vcsign::IssuerService::builder()
        .document(alice.unlocked_document())
        .suite(SuiteKind::JsonWebSignature2020)
        .fetcher(std::sync::Arc::new(vcsign_loader::OfflineFetcher))
        .build()
        .unwrap();

    let mut signed = issuer
        .sign(&sample_credential(&alice.did), &options(&alice.key_id))
        .await
        .unwrap();
    let jws = signed["proof"]["jws"].as_str().unwrap().to_string();
    assert!(jws.starts_with("eyJ"));
    assert_eq!(jws.split('.').count(), 3);
    assert!(signed["@context"]
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c == "https://w3id.org/security/suites/jws-2020/v1"));

    let verifier = offline_verifier();
    let outcome = verifier
        .verify(&VerifyCredentialRequest::new(signed.clone(), IssuerMembershipRegistry::new()))
        .await
        .unwrap();
    assert!(outcome.verified, "{:?}", outcome.error);

    signed["credentialSubject"]["id"] = json!("did:example:mallory");
    let outcome = verifier
        .verify(&VerifyCredentialRequest::new(signed, IssuerMembershipRegistry::new()))
        .await
        .unwrap();
    assert!(!outcome.verified);
}

// =========================================================================
// Errors
// =========================================================================

#[tokio::test]
async fn test_issuer_must_control_signing_key() {
    let alice = TestIdentity::from_seed(9);
    let issuer = offline_issuer(vec![alice.unlocked_document()]);
    let signed = issuer
        .sign(&sample_credential("did:example:someone-else"), &ProofOptions::default())
        .await
        .unwrap();

    let outcome = offline_verifier()
        .verify(&VerifyCredentialRequest::new(signed, IssuerMembershipRegistry::new()))
        .await
        .unwrap();
    assert!(!outcome.verified);
}

#[tokio::test]
async fn test_unknown_context_is_unresolvable() {
    let alice = TestIdentity::from_seed(10);
    let issuer = offline_issuer(vec![alice.unlocked_document()]);
    let mut credential = sample_credential(&alice.did);
    credential["@context"] = json!([
        "https://www.w3.org/2018/credentials/v1",
        "https://contexts.example.com/unpublished/v1"
    ]);

    let err = issuer.sign(&credential, &ProofOptions::default()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnresolvableReference);
}

#[tokio::test]
async fn test_unsigned_credential_has_no_matching_proofs() {
    let alice = TestIdentity::from_seed(11);
    let outcome = offline_verifier()
        .verify(&VerifyCredentialRequest::new(
            sample_credential(&alice.did),
            IssuerMembershipRegistry::new(),
        ))
        .await
        .unwrap();
    assert!(!outcome.verified);
    assert_eq!(outcome.error.as_deref(), Some("no matching proofs found"));
}
