//! Integration test: holder presentations and the demo credential flow.

use serde_json::json;
use vcsign::{
    ErrorKind, IssuerMembershipRegistry, ProofOptions, ServiceError, VerifyPresentationRequest,
};
use vcsign_integration_tests::{
    flip_signature_byte, offline_issuer, offline_verifier, sample_credential, TestIdentity,
};

fn challenge(key_id: &str, challenge: &str) -> ProofOptions {
    ProofOptions::builder()
        .verification_method(key_id)
        .challenge(challenge)
        .build()
        .unwrap()
}

fn verify_options(challenge: &str) -> ProofOptions {
    ProofOptions::builder().challenge(challenge).build().unwrap()
}

// =========================================================================
// Issuer → Holder → Verifier
// =========================================================================

#[tokio::test]
async fn test_three_party_presentation() {
    let university = TestIdentity::from_seed(1);
    let student = TestIdentity::from_seed(2);

    let credential = offline_issuer(vec![university.unlocked_document()])
        .sign(&sample_credential(&university.did), &ProofOptions::default())
        .await
        .unwrap();

    let wallet = offline_issuer(vec![student.unlocked_document()]);
    let vp = wallet
        .create_and_sign_presentation(
            Some(&credential),
            "urn:uuid:presentation-1",
            &student.did,
            &challenge(&student.key_id, "nonce-1"),
        )
        .await
        .unwrap();
    assert_eq!(vp["holder"], student.did.as_str());
    assert_eq!(vp["verifiableCredential"][0], credential);

    let registry = IssuerMembershipRegistry::new().with_member(university.did.clone(), json!({}));
    let verifier = offline_verifier();
    let outcome = verifier
        .verify_presentation(
            &VerifyPresentationRequest::new(vp.clone(), registry.clone())
                .with_options(verify_options("nonce-1")),
        )
        .await
        .unwrap();
    assert!(outcome.verified, "{:?}", outcome.error);
    assert!(outcome.valid);
    let credential_results = outcome.credential_results.unwrap();
    assert_eq!(credential_results.len(), 1);
    assert_eq!(credential_results[0].id.as_deref(), Some("urn:uuid:9d4f3b7e-1c2a-4e8b-b5a6-0f7c3d2e1b40"));
    assert!(credential_results[0].result.verified);

    // replay with another challenge
    let outcome = verifier
        .verify_presentation(
            &VerifyPresentationRequest::new(vp, registry).with_options(verify_options("nonce-2")),
        )
        .await
        .unwrap();
    assert!(!outcome.verified);
}

#[tokio::test]
async fn test_holder_verifies_own_presentation() {
    let university = TestIdentity::from_seed(12);
    let student = TestIdentity::from_seed(13);

    let credential = offline_issuer(vec![university.unlocked_document()])
        .sign(&sample_credential(&university.did), &ProofOptions::default())
        .await
        .unwrap();
    let wallet = offline_issuer(vec![student.unlocked_document()]);
    let vp = wallet
        .create_and_sign_presentation(Some(&credential), "urn:uuid:p", &student.did, &challenge(&student.key_id, "n"))
        .await
        .unwrap();

    // the wallet's default key pins the presentation proof, not the credential's
    let result = wallet.verify_presentation(&vp, &verify_options("n")).await.unwrap();
    assert!(result.verified, "{:?}", result.error);
}

#[tokio::test]
async fn test_tampered_embedded_credential_fails_presentation() {
    let university = TestIdentity::from_seed(3);
    let student = TestIdentity::from_seed(4);

    let mut credential = offline_issuer(vec![university.unlocked_document()])
        .sign(&sample_credential(&university.did), &ProofOptions::default())
        .await
        .unwrap();
    flip_signature_byte(&mut credential);

    let vp = offline_issuer(vec![student.unlocked_document()])
        .create_and_sign_presentation(
            Some(&credential),
            "urn:uuid:presentation-2",
            &student.did,
            &challenge(&student.key_id, "nonce"),
        )
        .await
        .unwrap();

    let outcome = offline_verifier()
        .verify_presentation(
            &VerifyPresentationRequest::new(vp, IssuerMembershipRegistry::new())
                .with_options(verify_options("nonce")),
        )
        .await
        .unwrap();
    assert!(!outcome.verified);
    assert!(!outcome.valid);
    let credential_results = outcome.credential_results.unwrap();
    assert!(!credential_results[0].result.verified);
    // the presentation's own proof still verifies
    assert!(outcome.results.iter().any(|r| r.verified));
}

#[tokio::test]
async fn test_holder_only_presentation_is_valid() {
    let student = TestIdentity::from_seed(5);
    let vp = offline_issuer(vec![student.unlocked_document()])
        .create_and_sign_presentation(None, "urn:uuid:p", &student.did, &challenge(&student.key_id, "c"))
        .await
        .unwrap();
    assert!(vp.get("verifiableCredential").is_none());

    let outcome = offline_verifier()
        .verify_presentation(
            &VerifyPresentationRequest::new(vp, IssuerMembershipRegistry::new())
                .with_options(verify_options("c")),
        )
        .await
        .unwrap();
    assert!(outcome.verified);
    assert!(outcome.valid);
}

#[tokio::test]
async fn test_presentation_domain_binding() {
    let student = TestIdentity::from_seed(6);
    let options = ProofOptions::builder()
        .verification_method(student.key_id.as_str())
        .challenge("c")
        .domain("verifier.example")
        .build()
        .unwrap();
    let vp = offline_issuer(vec![student.unlocked_document()])
        .create_and_sign_presentation(None, "urn:uuid:p", &student.did, &options)
        .await
        .unwrap();
    assert_eq!(vp["proof"]["domain"], "verifier.example");

    let verifier = offline_verifier();
    let wrong_domain = ProofOptions::builder().challenge("c").domain("evil.example").build().unwrap();
    let outcome = verifier
        .verify_presentation(
            &VerifyPresentationRequest::new(vp.clone(), IssuerMembershipRegistry::new())
                .with_options(wrong_domain),
        )
        .await
        .unwrap();
    assert!(!outcome.verified);

    let right_domain = ProofOptions::builder().challenge("c").domain("verifier.example").build().unwrap();
    let outcome = verifier
        .verify_presentation(
            &VerifyPresentationRequest::new(vp, IssuerMembershipRegistry::new())
                .with_options(right_domain),
        )
        .await
        .unwrap();
    assert!(outcome.verified);
}

// =========================================================================
// Demo credential request
// =========================================================================

#[tokio::test]
async fn test_demo_credential_request_flow() {
    let issuer_identity = TestIdentity::from_seed(7);
    let learner = TestIdentity::from_seed(8);
    let issuer = offline_issuer(vec![issuer_identity.unlocked_document()]);

    let request = offline_issuer(vec![learner.unlocked_document()])
        .create_and_sign_presentation(
            None,
            "urn:uuid:demo-request",
            &learner.did,
            &challenge(&learner.key_id, "issuer-nonce"),
        )
        .await
        .unwrap();

    let credential = issuer.request_demo_credential(&request, false).await.unwrap();
    assert_eq!(credential["credentialSubject"]["id"], learner.did.as_str());

    let registry = IssuerMembershipRegistry::new().with_member(issuer_identity.did.clone(), json!({}));
    let outcome = offline_verifier()
        .verify(&vcsign::VerifyCredentialRequest::new(credential, registry))
        .await
        .unwrap();
    assert!(outcome.verified && outcome.valid, "{:?}", outcome.error);
}

#[tokio::test]
async fn test_demo_credential_request_with_forged_proof() {
    let issuer = offline_issuer(vec![TestIdentity::from_seed(9).unlocked_document()]);
    let learner = TestIdentity::from_seed(10);

    let mut request = offline_issuer(vec![learner.unlocked_document()])
        .create_and_sign_presentation(None, "urn:uuid:r", &learner.did, &challenge(&learner.key_id, "n"))
        .await
        .unwrap();
    flip_signature_byte(&mut request);

    let err = issuer.request_demo_credential(&request, false).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidCredentialRequest);
    assert!(matches!(err, ServiceError::InvalidCredentialRequest(_)));
}

#[tokio::test]
async fn test_demo_credential_request_missing_challenge() {
    let issuer = offline_issuer(vec![TestIdentity::from_seed(11).unlocked_document()]);
    let request = json!({
        "@context": ["https://www.w3.org/2018/credentials/v1"],
        "type": ["VerifiablePresentation"],
        "holder": "did:example:learner",
        "proof": {
            "type": "Ed25519Signature2020",
            "verificationMethod": "did:example:learner#key-1",
            "proofPurpose": "authentication",
            "proofValue": "z3yz"
        }
    });

    let err = issuer.request_demo_credential(&request, false).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidProofProperty);
}
