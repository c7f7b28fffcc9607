//! Integration test: document loader resolution order and registration rules.

use std::sync::Arc;

use serde_json::json;
use vcsign_integration_tests::{CountingFetcher, TaggedResolver, TestIdentity};
use vcsign_loader::{
    ContextRegistry, DidKeyResolver, DocumentLoader, LoaderError, RemoteDocument,
};

const CUSTOM_CONTEXT: &str = "https://contexts.example.com/custom/v1";

#[tokio::test]
async fn test_full_priority_chain() {
    let alice = TestIdentity::from_seed(1);
    let resolver = Arc::new(TaggedResolver::new("resolver"));
    let fetcher = Arc::new(
        CountingFetcher::default()
            .with_document(CUSTOM_CONTEXT, json!({"from": "network"}))
            .with_document("https://example.com/remote.json", json!({"from": "network"})),
    );

    let mut builder = DocumentLoader::builder();
    builder
        .add_contexts(ContextRegistry::new().add_context(CUSTOM_CONTEXT, json!({"from": "registry"})))
        .unwrap()
        .add_document(&alice.unlocked_document())
        .unwrap()
        .add_resolver("did:key:", resolver.clone())
        .unwrap()
        .add_resolver(CUSTOM_CONTEXT, resolver.clone())
        .unwrap()
        .fetcher(fetcher.clone())
        .unwrap();
    let loader = builder.finalize().unwrap();

    // (a) preloaded beats the did:key resolver
    let key = loader.resolve(&alice.key_id).await.unwrap();
    assert_eq!(key.document["publicKeyMultibase"], alice.key.public_key().to_multibase());
    assert!(key.document.get("privateKeyMultibase").is_none());
    assert_eq!(resolver.calls(), 0);

    // (b) resolver beats the context registry, even for a context URL
    let ctx = loader.resolve(CUSTOM_CONTEXT).await.unwrap();
    assert_eq!(ctx.document["resolvedBy"], "resolver");
    assert_eq!(resolver.calls(), 1);

    // unknown did:key goes to the resolver
    let bob = TestIdentity::from_seed(2);
    assert_eq!(loader.document(&bob.did).await.unwrap()["resolvedBy"], "resolver");

    // (d) network only for what nothing else matched
    let remote = loader.resolve("https://example.com/remote.json").await.unwrap();
    assert_eq!(remote.document["from"], "network");
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn test_pinned_contexts_never_touch_network() {
    let fetcher = Arc::new(CountingFetcher::default());
    let mut builder = DocumentLoader::builder();
    builder
        .add_contexts(ContextRegistry::with_defaults().unwrap())
        .unwrap()
        .fetcher(fetcher.clone())
        .unwrap();
    let loader = builder.finalize().unwrap();

    for url in [
        "https://www.w3.org/2018/credentials/v1",
        "https://w3id.org/security/suites/ed25519-2020/v1",
        "https://w3id.org/security/suites/jws-2020/v1",
        "https://www.w3.org/ns/did/v1",
    ] {
        let RemoteDocument {
            document,
            document_url,
            context_url,
        } = loader.resolve(url).await.unwrap();
        assert!(document.get("@context").is_some(), "{url}");
        assert_eq!(document_url, url);
        assert!(context_url.is_none());
    }
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_context_registration_last_write_wins() {
    let registry = ContextRegistry::new()
        .add_context(CUSTOM_CONTEXT, json!({"version": 1}))
        .add_context(CUSTOM_CONTEXT, json!({"version": 2}));

    let mut builder = DocumentLoader::builder();
    builder
        .add_contexts(registry)
        .unwrap()
        .add_context(CUSTOM_CONTEXT, json!({"version": 3}))
        .unwrap();
    let loader = builder.finalize().unwrap();

    assert_eq!(loader.document(CUSTOM_CONTEXT).await.unwrap()["version"], 3);
    assert_eq!(loader.document(CUSTOM_CONTEXT).await.unwrap()["version"], 3);
}

#[tokio::test]
async fn test_registration_after_finalize_fails() {
    let mut builder = DocumentLoader::builder();
    builder.finalize().unwrap();

    assert!(matches!(
        builder.add_context(CUSTOM_CONTEXT, json!({})),
        Err(LoaderError::Configuration(_))
    ));
    assert!(matches!(
        builder.add_resolver("did:key:", Arc::new(DidKeyResolver::new())),
        Err(LoaderError::Configuration(_))
    ));
    assert!(matches!(builder.finalize(), Err(LoaderError::Configuration(_))));
}

#[tokio::test]
async fn test_offline_unknown_url_is_unresolvable() {
    let loader = DocumentLoader::builder().finalize().unwrap();
    let err = loader.resolve("https://example.com/anything.json").await.unwrap_err();
    assert!(matches!(err, LoaderError::UnresolvableReference { .. }));

    let err = loader.resolve("not a url").await.unwrap_err();
    assert!(matches!(err, LoaderError::Configuration(_)));
}

#[tokio::test]
async fn test_did_key_resolver_end_to_end() {
    let alice = TestIdentity::from_seed(3);
    let mut builder = DocumentLoader::builder();
    builder
        .add_resolver("did:key:", Arc::new(DidKeyResolver::new()))
        .unwrap();
    let loader = builder.finalize().unwrap();

    let document = loader.document(&alice.did).await.unwrap();
    assert_eq!(document["id"], alice.did.as_str());
    assert_eq!(document["assertionMethod"][0], alice.key_id.as_str());

    let key = loader.document(&alice.key_id).await.unwrap();
    assert_eq!(key["controller"], alice.did.as_str());
    assert_eq!(key["type"], "Ed25519VerificationKey2020");
}
