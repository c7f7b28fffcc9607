//! Integration test: did:web issuers resolved over a (stubbed) network.

use std::sync::Arc;

use serde_json::json;
use vcsign::{
    IssuerMembershipRegistry, IssuerService, ProofOptions, VerifierService,
    VerifyCredentialRequest, DEFAULT_REGISTRY_URL,
};
use vcsign_crypto::KeyPair;
use vcsign_integration_tests::{did_web_document, sample_credential, CountingFetcher};
use vcsign_loader::OfflineFetcher;

const DID: &str = "did:web:issuer.example";
const DID_URL: &str = "https://issuer.example/.well-known/did.json";

fn issuer_key() -> KeyPair {
    KeyPair::from_seed(&[42u8; 32])
}

fn published_fetcher() -> Arc<CountingFetcher> {
    let public = did_web_document(DID, &issuer_key()).public_view();
    Arc::new(
        CountingFetcher::default()
            .with_document(DID_URL, public.to_value().unwrap())
            .with_document(DEFAULT_REGISTRY_URL, json!({"registry": {DID: {"name": "Issuer Example"}}})),
    )
}

async fn signed_credential() -> serde_json::Value {
    let issuer = IssuerService::builder()
        .document(did_web_document(DID, &issuer_key()))
        .fetcher(Arc::new(OfflineFetcher))
        .build()
        .unwrap();
    assert_eq!(issuer.default_signing_identifier(), format!("{DID}#key-1"));
    issuer
        .sign(&sample_credential(DID), &ProofOptions::default())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_verifier_resolves_did_web_issuer() {
    let fetcher = published_fetcher();
    let verifier = VerifierService::builder()
        .fetcher(fetcher.clone())
        .build()
        .unwrap();

    let registry = IssuerMembershipRegistry::fetch(DEFAULT_REGISTRY_URL, fetcher.as_ref())
        .await
        .unwrap();
    let outcome = verifier
        .verify(&VerifyCredentialRequest::new(signed_credential().await, registry))
        .await
        .unwrap();
    assert!(outcome.verified, "{:?}", outcome.error);
    assert!(outcome.valid);
    // registry plus at least one did.json fetch
    assert!(fetcher.calls() >= 2);
}

#[tokio::test]
async fn test_preloaded_did_web_document_skips_network() {
    let fetcher = published_fetcher();
    let public = did_web_document(DID, &issuer_key()).public_view();
    let verifier = VerifierService::builder()
        .document(public)
        .fetcher(fetcher.clone())
        .build()
        .unwrap();

    let outcome = verifier
        .verify(&VerifyCredentialRequest::new(
            signed_credential().await,
            IssuerMembershipRegistry::new(),
        ))
        .await
        .unwrap();
    assert!(outcome.verified, "{:?}", outcome.error);
    assert!(!outcome.valid);
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_unpublished_did_web_is_an_error() {
    let verifier = VerifierService::builder()
        .fetcher(Arc::new(CountingFetcher::default()))
        .build()
        .unwrap();

    let err = verifier
        .verify(&VerifyCredentialRequest::new(
            signed_credential().await,
            IssuerMembershipRegistry::new(),
        ))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), vcsign::ErrorKind::UnresolvableReference);
}

#[tokio::test]
async fn test_verification_key_from_did_web() {
    let verifier = VerifierService::builder()
        .fetcher(published_fetcher())
        .build()
        .unwrap();
    let key = verifier
        .create_verification_key(&format!("{DID}#key-1"))
        .await
        .unwrap();
    assert_eq!(key["controller"], DID);
    assert_eq!(key["publicKeyMultibase"], issuer_key().public_key().to_multibase());
    assert!(key.get("privateKeyMultibase").is_none());
}
