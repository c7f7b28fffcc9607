//! Fixtures shared by the integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use vcsign::{IssuerService, VerifierService};
use vcsign_core::{DidDocument, VerificationKey, VerificationRelationship};
use vcsign_crypto::{KeyPair, Signature};
use vcsign_loader::{
    did_key_identifiers, unlocked_did_key_document, DidMethodResolver, DocumentFetcher,
    LoaderError, OfflineFetcher,
};

pub const CREATED: &str = "2021-05-01T23:38:10.000Z";

/// A did:key identity derived from a fixed seed.
pub struct TestIdentity {
    pub key: KeyPair,
    pub did: String,
    pub key_id: String,
}

impl TestIdentity {
    pub fn from_seed(seed: u8) -> Self {
        let key = KeyPair::from_seed(&[seed; 32]);
        let (did, key_id) = did_key_identifiers(&key.public_key());
        Self { key, did, key_id }
    }

    pub fn unlocked_document(&self) -> DidDocument {
        unlocked_did_key_document(&self.key)
    }
}

/// Unlocked did:web document with one key, `<did>#key-1`, listed by
/// reference under every relationship.
pub fn did_web_document(did: &str, key: &KeyPair) -> DidDocument {
    let key_id = format!("{did}#key-1");
    let reference = || vec![VerificationRelationship::Reference("#key-1".into())];
    DidDocument {
        context: json!(["https://www.w3.org/ns/did/v1", "https://w3id.org/security/suites/ed25519-2020/v1"]),
        id: did.to_string(),
        verification_method: vec![VerificationKey {
            id: key_id,
            key_type: "Ed25519VerificationKey2020".into(),
            controller: did.to_string(),
            public_key_multibase: key.public_key().to_multibase(),
            private_key_multibase: Some(key.to_private_multibase()),
        }],
        assertion_method: reference(),
        authentication: reference(),
        capability_delegation: Vec::new(),
        capability_invocation: Vec::new(),
        extra: serde_json::Map::new(),
    }
}

/// Unlocked document in the plain issuer layout: a single string
/// `@context`, the key embedded under `assertionMethod`, no
/// `verificationMethod` array.
pub fn embedded_key_document(did: &str, key: &KeyPair) -> DidDocument {
    let document = json!({
        "@context": "https://w3id.org/security/v2",
        "id": did,
        "assertionMethod": [{
            "id": format!("{did}#key-1"),
            "type": "Ed25519VerificationKey2020",
            "controller": did,
            "publicKeyMultibase": key.public_key().to_multibase(),
            "privateKeyMultibase": key.to_private_multibase()
        }]
    });
    serde_json::from_value(document).expect("embedded key document")
}

/// Minimal VC v1 credential from `issuer` about `did:example:abcdef`.
pub fn sample_credential(issuer: &str) -> Value {
    json!({
        "@context": ["https://www.w3.org/2018/credentials/v1"],
        "id": "urn:uuid:9d4f3b7e-1c2a-4e8b-b5a6-0f7c3d2e1b40",
        "type": ["VerifiableCredential"],
        "issuer": issuer,
        "issuanceDate": "2021-01-01T19:23:24Z",
        "credentialSubject": {"id": "did:example:abcdef"}
    })
}

pub fn offline_issuer(documents: Vec<DidDocument>) -> IssuerService {
    IssuerService::builder()
        .documents(documents)
        .fetcher(Arc::new(OfflineFetcher))
        .build()
        .expect("issuer service")
}

pub fn offline_verifier() -> VerifierService {
    VerifierService::builder()
        .fetcher(Arc::new(OfflineFetcher))
        .build()
        .expect("verifier service")
}

/// Flip one byte of the raw Ed25519 signature in `proof.proofValue` and
/// re-encode it, so the value still decodes.
pub fn flip_signature_byte(document: &mut Value) {
    let encoded = document["proof"]["proofValue"]
        .as_str()
        .expect("proofValue");
    let mut bytes = Signature::from_multibase(encoded)
        .expect("decodable signature")
        .to_bytes();
    bytes[10] ^= 0x01;
    let tampered = Signature::from_bytes(&bytes).expect("64 bytes").to_multibase();
    document["proof"]["proofValue"] = json!(tampered);
}

/// Fetcher serving fixed documents and counting requests.
#[derive(Default)]
pub struct CountingFetcher {
    documents: Vec<(String, Value)>,
    calls: AtomicUsize,
}

impl CountingFetcher {
    pub fn with_document(mut self, url: &str, document: Value) -> Self {
        self.documents.push((url.to_string(), document));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentFetcher for CountingFetcher {
    async fn fetch(&self, url: &str) -> Result<Value, LoaderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.documents
            .iter()
            .find(|(u, _)| u == url)
            .map(|(_, document)| document.clone())
            .ok_or_else(|| LoaderError::unresolvable(url, "HTTP 404 Not Found"))
    }
}

/// Resolver answering every URL with a tagged document, counting calls.
pub struct TaggedResolver {
    pub tag: &'static str,
    calls: AtomicUsize,
}

impl TaggedResolver {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DidMethodResolver for TaggedResolver {
    async fn resolve(&self, url: &str) -> Result<Value, LoaderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(json!({"id": url, "resolvedBy": self.tag}))
    }
}
