//! vcsign Loader: dereferences JSON-LD contexts and DID / key identifiers.
//!
//! A [`DocumentLoader`] is assembled once through [`DocumentLoaderBuilder`]
//! and then shared read-only by signers and verifiers.

pub mod contexts;
pub mod did_key;
pub mod did_web;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod resolver;

pub use contexts::{ContextBundle, ContextRegistry};
pub use did_key::{did_key_document, did_key_identifiers, unlocked_did_key_document, DidKeyResolver};
pub use did_web::{did_web_document_url, DidWebResolver};
pub use error::LoaderError;
pub use fetch::{DocumentFetcher, HttpFetcher, OfflineFetcher, StaticFetcher};
pub use loader::{DocumentLoader, DocumentLoaderBuilder, RemoteDocument};
pub use resolver::{select_key_node, wrap_key_node, DidMethodResolver, ResolverRegistry};
