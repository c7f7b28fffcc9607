//! Integration test: issuer documents with keys embedded under
//! `assertionMethod` instead of listed in `verificationMethod`.

use std::sync::Arc;

use serde_json::json;
use vcsign::{
    IssuerMembershipRegistry, IssuerService, ProofOptions, ServiceError, VerifierService,
    VerifyCredentialRequest, VerifyPresentationRequest,
};
use vcsign_core::VerificationRelationship;
use vcsign_crypto::KeyPair;
use vcsign_integration_tests::{embedded_key_document, sample_credential};
use vcsign_loader::OfflineFetcher;

const DID: &str = "did:web:digitalcredentials.github.io";

fn key() -> KeyPair {
    KeyPair::from_seed(&[77u8; 32])
}

fn key_id() -> String {
    format!("{DID}#key-1")
}

#[tokio::test]
async fn test_embedded_assertion_key_round_trip() {
    let document = embedded_key_document(DID, &key());
    assert!(document.verification_method.is_empty());
    assert!(document.validate().is_ok());

    let issuer = IssuerService::builder()
        .document(document.clone())
        .fetcher(Arc::new(OfflineFetcher))
        .build()
        .unwrap();
    assert_eq!(issuer.default_signing_identifier(), key_id());

    let signed = issuer
        .sign(&sample_credential(DID), &ProofOptions::default())
        .await
        .unwrap();
    assert_eq!(signed["proof"]["verificationMethod"], key_id());

    let self_check = issuer.verify(&signed, &ProofOptions::default()).await.unwrap();
    assert!(self_check.verified, "{:?}", self_check.error);
    assert!(self_check.error.is_none());

    let public = document.public_view();
    let text = serde_json::to_string(&public.to_value().unwrap()).unwrap();
    assert!(!text.contains("privateKeyMultibase"));

    let verifier = VerifierService::builder()
        .document(public)
        .fetcher(Arc::new(OfflineFetcher))
        .build()
        .unwrap();
    let registry = IssuerMembershipRegistry::new().with_member(DID, json!({"name": "DCC"}));
    let outcome = verifier
        .verify(&VerifyCredentialRequest::new(signed, registry))
        .await
        .unwrap();
    assert!(outcome.verified, "{:?}", outcome.error);
    assert!(outcome.valid);
}

#[tokio::test]
async fn test_assertion_only_key_cannot_sign_presentation() {
    let issuer = IssuerService::builder()
        .document(embedded_key_document(DID, &key()))
        .fetcher(Arc::new(OfflineFetcher))
        .build()
        .unwrap();
    let options = ProofOptions::builder()
        .verification_method(key_id())
        .challenge("nonce")
        .build()
        .unwrap();

    let err = issuer
        .create_and_sign_presentation(None, "urn:uuid:vp", DID, &options)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Configuration(_)), "{err}");
}

#[tokio::test]
async fn test_embedded_authentication_key_signs_presentation() {
    let mut document = embedded_key_document(DID, &key());
    document.authentication = document.assertion_method.clone();
    assert!(matches!(
        document.authentication[0],
        VerificationRelationship::Embedded(_)
    ));

    let issuer = IssuerService::builder()
        .document(document.clone())
        .fetcher(Arc::new(OfflineFetcher))
        .build()
        .unwrap();
    let options = ProofOptions::builder()
        .verification_method(key_id())
        .challenge("nonce")
        .build()
        .unwrap();
    let vp = issuer
        .create_and_sign_presentation(None, "urn:uuid:vp", DID, &options)
        .await
        .unwrap();

    let verifier = VerifierService::builder()
        .document(document.public_view())
        .fetcher(Arc::new(OfflineFetcher))
        .build()
        .unwrap();
    let outcome = verifier
        .verify_presentation(
            &VerifyPresentationRequest::new(vp, IssuerMembershipRegistry::new()).with_options(
                ProofOptions::builder().challenge("nonce").build().unwrap(),
            ),
        )
        .await
        .unwrap();
    assert!(outcome.verified, "{:?}", outcome.error);
    assert!(outcome.valid);
}
