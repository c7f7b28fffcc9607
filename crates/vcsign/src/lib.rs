//! vcsign: issue and verify W3C Verifiable Credentials and Presentations.
//!
//! [`IssuerService`] signs with keys from unlocked DID documents;
//! [`VerifierService`] verifies proofs and, independently, checks issuers
//! against an [`IssuerMembershipRegistry`].

pub mod demo;
pub mod error;
pub mod issuer;
pub mod key_store;
mod loader;
pub mod registry;
pub mod verifier;

pub use demo::{default_demo_template, stamp_demo_credential};
pub use error::{ErrorKind, ServiceError};
pub use issuer::{IssuerService, IssuerServiceBuilder};
pub use key_store::KeyStore;
pub use registry::{
    IssuerMembershipRegistry, IssuerMembershipValidator, RegistryMembershipValidator,
    DEFAULT_REGISTRY_URL,
};
pub use verifier::{
    VerifierService, VerifierServiceBuilder, VerifyCredentialRequest, VerifyOutcome,
    VerifyPresentationRequest,
};

pub use vcsign_core::{get_controller, DidDocument, ProofOptions, ProofPurpose, VerificationKey};
pub use vcsign_ldp::{SuiteKind, VerificationResult};
