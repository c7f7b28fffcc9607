//! vcsign LDP: linked-data proofs over JSON credentials and presentations.
//!
//! Every dereference (contexts, verification methods, controller documents)
//! goes through the injected [`DocumentLoader`](vcsign_loader::DocumentLoader).

pub mod credential;
pub mod error;
pub mod presentation;
pub mod proof;
pub mod purpose;
pub mod result;
pub mod suite;

pub use credential::{credential_issuer, issue, validate_credential, verify_credential};
pub use error::LdpError;
pub use presentation::{
    create_presentation, presentation_credentials, sign_presentation, validate_presentation,
    verify_presentation,
};
pub use proof::{create_proof, create_verify_data, verify_proofs};
pub use purpose::{Purpose, PurposeOutcome};
pub use result::{CredentialResult, ProofResult, VerificationResult};
pub use suite::{
    public_key_from_node, Ed25519Signature2020, JsonWebSignature2020, SignatureSuite,
    SigningSuite, SuiteKind,
};
