//! Signature suites and the signing material bound to one issue/sign call.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use vcsign_core::canonicalize;
use vcsign_crypto::{sign, verify, CryptoError, KeyPair, PublicKey, Signature};
use vcsign_loader::contexts::{ED25519_2020_V1_URL, JWS_2020_V1_URL};

use crate::error::LdpError;

/// A linked-data signature suite: turns verify data into a signature value
/// stored on the proof, and checks it back.
pub trait SignatureSuite: Send + Sync {
    /// Value of the proof's `type`.
    fn proof_type(&self) -> &'static str;

    /// JSON-LD context defining the suite's terms.
    fn context_url(&self) -> &'static str;

    /// Proof member holding the signature (`proofValue` or `jws`).
    fn signature_property(&self) -> &'static str;

    fn sign(&self, verify_data: &[u8], key: &KeyPair) -> Result<String, LdpError>;

    /// `Ok(false)` for a well-formed signature that does not match.
    fn verify(&self, verify_data: &[u8], signature: &str, key: &PublicKey) -> Result<bool, LdpError>;
}

/// `Ed25519Signature2020`: multibase base58btc signature in `proofValue`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Signature2020;

impl SignatureSuite for Ed25519Signature2020 {
    fn proof_type(&self) -> &'static str {
        "Ed25519Signature2020"
    }

    fn context_url(&self) -> &'static str {
        ED25519_2020_V1_URL
    }

    fn signature_property(&self) -> &'static str {
        "proofValue"
    }

    fn sign(&self, verify_data: &[u8], key: &KeyPair) -> Result<String, LdpError> {
        Ok(sign(verify_data, key).to_multibase())
    }

    fn verify(&self, verify_data: &[u8], signature: &str, key: &PublicKey) -> Result<bool, LdpError> {
        match Signature::from_multibase(signature) {
            Ok(signature) => check(verify(verify_data, &signature, key)),
            Err(e) => undecodable(e),
        }
    }
}

/// `JsonWebSignature2020`: detached, unencoded-payload JWS in `jws`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonWebSignature2020;

impl JsonWebSignature2020 {
    fn header() -> Value {
        json!({ "alg": "EdDSA", "b64": false, "crit": ["b64"] })
    }

    fn signing_input(encoded_header: &str, verify_data: &[u8]) -> Vec<u8> {
        let mut input = Vec::with_capacity(encoded_header.len() + 1 + verify_data.len());
        input.extend_from_slice(encoded_header.as_bytes());
        input.push(b'.');
        input.extend_from_slice(verify_data);
        input
    }
}

impl SignatureSuite for JsonWebSignature2020 {
    fn proof_type(&self) -> &'static str {
        "JsonWebSignature2020"
    }

    fn context_url(&self) -> &'static str {
        JWS_2020_V1_URL
    }

    fn signature_property(&self) -> &'static str {
        "jws"
    }

    fn sign(&self, verify_data: &[u8], key: &KeyPair) -> Result<String, LdpError> {
        let encoded_header = URL_SAFE_NO_PAD.encode(canonicalize(&Self::header())?);
        let signature = sign(&Self::signing_input(&encoded_header, verify_data), key);
        Ok(format!("{encoded_header}..{}", signature.to_base64url()))
    }

    fn verify(&self, verify_data: &[u8], jws: &str, key: &PublicKey) -> Result<bool, LdpError> {
        let mut parts = jws.split('.');
        let (Some(encoded_header), Some(""), Some(encoded_signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(LdpError::MalformedProof("jws is not a detached JWS".into()));
        };

        let header: Value = URL_SAFE_NO_PAD
            .decode(encoded_header)
            .map_err(|e| LdpError::MalformedProof(format!("jws header is not base64url: {e}")))
            .and_then(|bytes| Ok(serde_json::from_slice::<Value>(&bytes)?))?;
        if header.get("alg").and_then(Value::as_str) != Some("EdDSA") {
            return Err(LdpError::MalformedProof(format!(
                "unsupported jws algorithm: {}",
                header["alg"]
            )));
        }
        if header.get("b64") != Some(&Value::Bool(false)) {
            return Err(LdpError::MalformedProof("jws payload must be unencoded".into()));
        }

        match Signature::from_base64url(encoded_signature) {
            Ok(signature) => check(verify(
                &Self::signing_input(encoded_header, verify_data),
                &signature,
                key,
            )),
            Err(e) => undecodable(e),
        }
    }
}

// Undecodable signature values verify as false.
fn undecodable(error: CryptoError) -> Result<bool, LdpError> {
    tracing::debug!(error = %error, "signature value does not decode");
    Ok(false)
}

fn check(result: Result<(), CryptoError>) -> Result<bool, LdpError> {
    match result {
        Ok(()) => Ok(true),
        Err(CryptoError::SignatureVerificationFailed) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

static ED25519_SIGNATURE_2020: Ed25519Signature2020 = Ed25519Signature2020;
static JSON_WEB_SIGNATURE_2020: JsonWebSignature2020 = JsonWebSignature2020;

/// The supported suites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SuiteKind {
    #[default]
    Ed25519Signature2020,
    JsonWebSignature2020,
}

impl SuiteKind {
    pub fn suite(&self) -> &'static dyn SignatureSuite {
        match self {
            Self::Ed25519Signature2020 => &ED25519_SIGNATURE_2020,
            Self::JsonWebSignature2020 => &JSON_WEB_SIGNATURE_2020,
        }
    }

    /// The suite producing proofs of the given `type`, if supported.
    pub fn from_proof_type(proof_type: &str) -> Option<Self> {
        match proof_type {
            "Ed25519Signature2020" => Some(Self::Ed25519Signature2020),
            "JsonWebSignature2020" => Some(Self::JsonWebSignature2020),
            _ => None,
        }
    }
}

impl fmt::Display for SuiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suite().proof_type())
    }
}

impl FromStr for SuiteKind {
    type Err = LdpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_proof_type(s)
            .ok_or_else(|| LdpError::Configuration(format!("unsupported signature suite: {s}")))
    }
}

/// Everything needed to produce one proof: suite, private key, the
/// verification method naming that key, and the proof date.
#[derive(Debug)]
pub struct SigningSuite {
    pub kind: SuiteKind,
    pub key: KeyPair,
    pub verification_method: String,
    pub created: String,
}

impl SigningSuite {
    pub fn new(
        kind: SuiteKind,
        key: KeyPair,
        verification_method: impl Into<String>,
        created: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            key,
            verification_method: verification_method.into(),
            created: created.into(),
        }
    }
}

/// Decode the public key of a verification method node.
///
/// Accepts `publicKeyMultibase` (Ed25519 multicodec) and Ed25519
/// `publicKeyJwk` (`kty: OKP`, `crv: Ed25519`).
pub fn public_key_from_node(node: &Value) -> Result<PublicKey, LdpError> {
    if let Some(multibase) = node.get("publicKeyMultibase").and_then(Value::as_str) {
        return Ok(PublicKey::from_multibase(multibase)?);
    }
    if let Some(jwk) = node.get("publicKeyJwk") {
        let field = |name: &str| jwk.get(name).and_then(Value::as_str);
        return match (field("kty"), field("crv"), field("x")) {
            (Some("OKP"), Some("Ed25519"), Some(x)) => Ok(PublicKey::from_jwk_x(x)?),
            _ => Err(LdpError::UnsupportedKey(format!("unsupported JWK: {jwk}"))),
        };
    }
    Err(LdpError::UnsupportedKey(format!(
        "{} carries no Ed25519 public key",
        node.get("id").and_then(Value::as_str).unwrap_or("verification method")
    )))
}
