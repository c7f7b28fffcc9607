//! Verifier service: cryptographic verification and issuer membership,
//! reported as two independent flags.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use vcsign_core::{DidDocument, ProofOptions, ProofPurpose};
use vcsign_ldp::{CredentialResult, ProofResult, Purpose, VerificationResult};
use vcsign_loader::{ContextRegistry, DocumentFetcher, DocumentLoader, HttpFetcher};

use crate::error::ServiceError;
use crate::issuer::id_of;
use crate::loader::service_loader;
use crate::registry::{IssuerMembershipRegistry, IssuerMembershipValidator, RegistryMembershipValidator};

/// Input of [`VerifierService::verify`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCredentialRequest {
    pub verifiable_credential: Value,
    #[serde(default)]
    pub issuer_membership_registry: IssuerMembershipRegistry,
    #[serde(default)]
    pub options: ProofOptions,
}

impl VerifyCredentialRequest {
    pub fn new(verifiable_credential: Value, issuer_membership_registry: IssuerMembershipRegistry) -> Self {
        Self {
            verifiable_credential,
            issuer_membership_registry,
            options: ProofOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ProofOptions) -> Self {
        self.options = options;
        self
    }
}

/// Input of [`VerifierService::verify_presentation`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPresentationRequest {
    pub verifiable_presentation: Value,
    #[serde(default)]
    pub issuer_membership_registry: IssuerMembershipRegistry,
    #[serde(default)]
    pub options: ProofOptions,
}

impl VerifyPresentationRequest {
    pub fn new(
        verifiable_presentation: Value,
        issuer_membership_registry: IssuerMembershipRegistry,
    ) -> Self {
        Self {
            verifiable_presentation,
            issuer_membership_registry,
            options: ProofOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ProofOptions) -> Self {
        self.options = options;
        self
    }
}

/// Verification outcome. `verified` is cryptographic validity, `valid` is
/// issuer membership; callers must check both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOutcome {
    pub verified: bool,
    pub valid: bool,
    #[serde(default)]
    pub results: Vec<ProofResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_results: Option<Vec<CredentialResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerifyOutcome {
    pub fn new(result: VerificationResult, valid: bool) -> Self {
        Self {
            verified: result.verified,
            valid,
            results: result.results,
            credential_results: result.credential_results,
            error: result.error,
        }
    }
}

/// Verifies credentials and presentations and checks their issuers against
/// a caller-supplied membership registry.
pub struct VerifierService {
    loader: DocumentLoader,
    validator: Arc<dyn IssuerMembershipValidator>,
}

impl VerifierService {
    /// Verifier with `documents` preloaded, the registry lookup validator and
    /// HTTP fallback.
    pub fn new(documents: Vec<DidDocument>) -> Result<Self, ServiceError> {
        Self::builder().documents(documents).build()
    }

    pub fn builder() -> VerifierServiceBuilder {
        VerifierServiceBuilder::default()
    }

    pub fn loader(&self) -> &DocumentLoader {
        &self.loader
    }

    pub fn validate_credential(&self, credential: &Value, registry: &IssuerMembershipRegistry) -> bool {
        self.validator.validate_credential(credential, registry)
    }

    pub fn validate_presentation(
        &self,
        presentation: &Value,
        registry: &IssuerMembershipRegistry,
    ) -> bool {
        self.validator.validate_presentation(presentation, registry)
    }

    /// Verify a credential and check its issuer's membership.
    ///
    /// `options.verificationMethod`, when set, restricts which proofs count.
    pub async fn verify(&self, request: &VerifyCredentialRequest) -> Result<VerifyOutcome, ServiceError> {
        let credential = &request.verifiable_credential;
        let options = &request.options;
        let purpose = Purpose::from_options(options);

        let result = vcsign_ldp::verify_credential(
            credential,
            options.verification_method(),
            &purpose,
            &self.loader,
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "credential verification failed");
            ServiceError::from(e)
        })?;
        let valid = self.validate_credential(credential, &request.issuer_membership_registry);

        tracing::info!(
            credential_id = id_of(credential),
            verified = result.verified,
            valid = valid,
            "credential checked"
        );
        Ok(VerifyOutcome::new(result, valid))
    }

    /// Verify a presentation and check the issuers of its credentials.
    ///
    /// The proof purpose is `authentication`; `options.challenge` and
    /// `options.domain` are matched against the presentation proof.
    pub async fn verify_presentation(
        &self,
        request: &VerifyPresentationRequest,
    ) -> Result<VerifyOutcome, ServiceError> {
        let presentation = &request.verifiable_presentation;
        let options = request.options.with_proof_purpose(ProofPurpose::Authentication);
        let purpose = Purpose::from_options(&options);

        let result = vcsign_ldp::verify_presentation(
            presentation,
            options.verification_method(),
            &purpose,
            &self.loader,
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "presentation verification failed");
            ServiceError::from(e)
        })?;
        let valid = self.validate_presentation(presentation, &request.issuer_membership_registry);

        tracing::info!(
            presentation_id = id_of(presentation),
            verified = result.verified,
            valid = valid,
            "presentation checked"
        );
        Ok(VerifyOutcome::new(result, valid))
    }

    /// Dereference a verification method through the loader.
    pub async fn create_verification_key(&self, id: &str) -> Result<Value, ServiceError> {
        Ok(self.loader.document(id).await?)
    }
}

impl std::fmt::Debug for VerifierService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifierService")
            .field("loader", &self.loader)
            .finish_non_exhaustive()
    }
}

/// Configuration for a [`VerifierService`].
#[derive(Default)]
pub struct VerifierServiceBuilder {
    documents: Vec<DidDocument>,
    fetcher: Option<Arc<dyn DocumentFetcher>>,
    validator: Option<Arc<dyn IssuerMembershipValidator>>,
    contexts: ContextRegistry,
}

impl VerifierServiceBuilder {
    /// DID documents to preload; they take priority over DID resolution.
    pub fn documents(mut self, documents: Vec<DidDocument>) -> Self {
        self.documents.extend(documents);
        self
    }

    pub fn document(mut self, document: DidDocument) -> Self {
        self.documents.push(document);
        self
    }

    /// Network fallback; [`HttpFetcher`] when unset.
    pub fn fetcher(mut self, fetcher: Arc<dyn DocumentFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Membership policy; [`RegistryMembershipValidator`] when unset.
    pub fn validator(mut self, validator: Arc<dyn IssuerMembershipValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn context(mut self, url: impl Into<String>, document: Value) -> Self {
        self.contexts = self.contexts.add_context(url, document);
        self
    }

    pub fn build(self) -> Result<VerifierService, ServiceError> {
        let fetcher: Arc<dyn DocumentFetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::new()),
        };
        let validator: Arc<dyn IssuerMembershipValidator> = match self.validator {
            Some(validator) => validator,
            None => Arc::new(RegistryMembershipValidator),
        };
        let loader = service_loader(&self.documents, self.contexts, fetcher)?;

        tracing::info!(preloaded = self.documents.len(), "verifier service ready");
        Ok(VerifierService { loader, validator })
    }
}
