//! vcsign Core: fundamental types and errors shared by every vcsign crate.
//!
//! - Proof options and proof-property lookup
//! - DID documents and verification keys
//! - DID URL parsing (controller extraction)
//! - Canonical bytes for signing input

pub mod canonical;
pub mod did;
pub mod document;
pub mod error;
pub mod proof;
pub mod proof_options;

pub use canonical::canonicalize;
pub use did::{get_controller, DidUrl};
pub use document::{DidDocument, VerificationKey, VerificationRelationship};
pub use error::CoreError;
pub use proof::{get_proof_property, get_proof_property_str, SECURITY_VOCAB_PREFIX};
pub use proof_options::{ProofOptions, ProofOptionsBuilder, ProofPurpose, DEFAULT_PROOF_PURPOSE};
