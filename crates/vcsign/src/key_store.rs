//! Signing keys gathered from unlocked DID documents.

use std::collections::HashMap;

use vcsign_core::{DidDocument, VerificationKey};
use vcsign_crypto::KeyPair;
use zeroize::Zeroize;

use crate::error::ServiceError;

/// Map of key identifier to verification key, built from the
/// `assertionMethod` entries of unlocked DID documents.
///
/// Insertion order is kept so that the first key of the first document is
/// the default signer. A duplicate identifier replaces the earlier key in
/// place. Private key strings are zeroized on drop.
#[derive(Default)]
pub struct KeyStore {
    keys: Vec<VerificationKey>,
    index: HashMap<String, usize>,
}

impl KeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from unlocked documents. Every document must validate.
    pub fn from_documents<'a>(
        documents: impl IntoIterator<Item = &'a DidDocument>,
    ) -> Result<Self, ServiceError> {
        let mut store = Self::new();
        for document in documents {
            document.validate()?;
            for key in document.assertion_keys() {
                store.insert(key.clone());
            }
        }
        Ok(store)
    }

    /// Insert a key, replacing any key with the same identifier.
    pub fn insert(&mut self, key: VerificationKey) {
        match self.index.get(&key.id) {
            Some(&position) => {
                tracing::debug!(key_id = %key.id, "replacing duplicate key");
                self.keys[position] = key;
            }
            None => {
                self.index.insert(key.id.clone(), self.keys.len());
                self.keys.push(key);
            }
        }
    }

    /// The key stored under `id`.
    pub fn get_key(&self, id: &str) -> Result<&VerificationKey, ServiceError> {
        self.index
            .get(id)
            .map(|&position| &self.keys[position])
            .ok_or_else(|| ServiceError::KeyNotFound(id.to_string()))
    }

    /// Identifier of the first key inserted.
    pub fn first_key_id(&self) -> Option<&str> {
        self.keys.first().map(|k| k.id.as_str())
    }

    /// Decode the private key stored under `id`.
    ///
    /// The decoded key must match the stored `publicKeyMultibase`.
    pub fn key_pair(&self, id: &str) -> Result<KeyPair, ServiceError> {
        let key = self.get_key(id)?;
        let private = key
            .private_key_multibase
            .as_deref()
            .ok_or_else(|| ServiceError::KeyNotFound(format!("{id} has no private key material")))?;

        let key_pair = KeyPair::from_private_multibase(private)?;
        if key_pair.public_key().to_multibase() != key.public_key_multibase {
            return Err(ServiceError::Configuration(format!(
                "private key of {id} does not match its publicKeyMultibase"
            )));
        }
        Ok(key_pair)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Key identifiers in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(|k| k.id.as_str())
    }
}

impl std::fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStore")
            .field("keys", &self.ids().collect::<Vec<_>>())
            .finish()
    }
}

impl Drop for KeyStore {
    fn drop(&mut self) {
        for key in &mut self.keys {
            if let Some(private) = key.private_key_multibase.as_mut() {
                private.zeroize();
            }
        }
    }
}
