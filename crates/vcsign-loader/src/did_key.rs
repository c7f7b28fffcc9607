//! `did:key` for Ed25519 keys: the DID document is derived from the key
//! itself, no I/O involved.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use vcsign_core::{DidDocument, DidUrl, VerificationKey, VerificationRelationship};
use vcsign_crypto::{KeyPair, PublicKey};

use crate::contexts::{DID_V1_URL, ED25519_2020_V1_URL};
use crate::error::LoaderError;
use crate::resolver::{wrap_key_node, DidMethodResolver};

/// Verification key type produced for Ed25519 keys.
pub const ED25519_KEY_TYPE: &str = "Ed25519VerificationKey2020";

/// The DID and key identifier of an Ed25519 public key.
///
/// `did:key:z6Mk…` and `did:key:z6Mk…#z6Mk…`.
pub fn did_key_identifiers(public: &PublicKey) -> (String, String) {
    let multibase = public.to_multibase();
    let did = format!("did:key:{multibase}");
    let key_id = format!("{did}#{multibase}");
    (did, key_id)
}

/// Public `did:key` document for a key.
pub fn did_key_document(public: &PublicKey) -> DidDocument {
    build_document(public, None)
}

/// `did:key` document carrying the private key, suitable for an issuer.
pub fn unlocked_did_key_document(keypair: &KeyPair) -> DidDocument {
    build_document(&keypair.public_key(), Some(keypair.to_private_multibase()))
}

fn build_document(public: &PublicKey, private_key_multibase: Option<String>) -> DidDocument {
    let (did, key_id) = did_key_identifiers(public);
    let key = VerificationKey {
        id: key_id.clone(),
        key_type: ED25519_KEY_TYPE.to_string(),
        controller: did.clone(),
        public_key_multibase: public.to_multibase(),
        private_key_multibase,
    };
    let by_reference = || vec![VerificationRelationship::Reference(key_id.clone())];

    DidDocument {
        context: json!([DID_V1_URL, ED25519_2020_V1_URL]),
        id: did,
        verification_method: vec![key],
        assertion_method: by_reference(),
        authentication: by_reference(),
        capability_delegation: by_reference(),
        capability_invocation: by_reference(),
        extra: Map::new(),
    }
}

/// Resolver for `did:key` DIDs and key identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct DidKeyResolver;

impl DidKeyResolver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DidMethodResolver for DidKeyResolver {
    async fn resolve(&self, url: &str) -> Result<Value, LoaderError> {
        let did_url = DidUrl::parse(url)?;
        if did_url.method() != "key" {
            return Err(LoaderError::unresolvable(
                url,
                format!("not a did:key identifier (method {})", did_url.method()),
            ));
        }

        let public = PublicKey::from_multibase(did_url.method_specific_id())
            .map_err(|e| LoaderError::unresolvable_with(url, "unsupported did:key encoding", e))?;
        let document = did_key_document(&public);

        match did_url.fragment() {
            None => Ok(document.to_value()?),
            Some(fragment) if fragment == did_url.method_specific_id() => {
                let key = &document.verification_method[0];
                Ok(wrap_key_node(serde_json::to_value(key)?))
            }
            Some(_) => Err(LoaderError::unresolvable(
                url,
                "fragment does not name the did:key key",
            )),
        }
    }
}
