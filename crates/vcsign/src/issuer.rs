//! Issuer service: signs credentials and presentations with keys from
//! unlocked DID documents.

use std::sync::Arc;

use serde_json::Value;
use vcsign_core::{get_controller, get_proof_property_str, DidDocument, ProofOptions, ProofPurpose, VerificationKey};
use vcsign_ldp::{create_presentation, issue, Purpose, SigningSuite, SuiteKind, VerificationResult};
use vcsign_loader::contexts::{CREDENTIALS_EXAMPLES_V1_URL, JWS_2020_LEGACY_URL};
use vcsign_loader::{ContextRegistry, DocumentFetcher, DocumentLoader, HttpFetcher};

use crate::demo::{default_demo_template, stamp_demo_credential};
use crate::error::ServiceError;
use crate::key_store::KeyStore;
use crate::loader::service_loader;

/// Signs credentials and presentations.
///
/// The key store and document loader are built once at construction and only
/// read afterwards, so one service can serve concurrent requests.
pub struct IssuerService {
    key_store: KeyStore,
    loader: DocumentLoader,
    default_signer: String,
    suite: SuiteKind,
    demo_template: Value,
}

impl IssuerService {
    /// Issuer over `documents` using the default suite and HTTP fallback.
    ///
    /// Without `default_signing_identifier` the first assertion key of the
    /// first document signs.
    pub fn new(
        documents: Vec<DidDocument>,
        default_signing_identifier: Option<String>,
    ) -> Result<Self, ServiceError> {
        let mut builder = Self::builder().documents(documents);
        if let Some(id) = default_signing_identifier {
            builder = builder.signing_identifier(id);
        }
        builder.build()
    }

    pub fn builder() -> IssuerServiceBuilder {
        IssuerServiceBuilder::default()
    }

    /// Key identifier used when options name no verification method.
    pub fn default_signing_identifier(&self) -> &str {
        &self.default_signer
    }

    pub fn suite(&self) -> SuiteKind {
        self.suite
    }

    pub fn key_store(&self) -> &KeyStore {
        &self.key_store
    }

    pub fn loader(&self) -> &DocumentLoader {
        &self.loader
    }

    /// Suite, private key and proof date for the key named in `options`
    /// (or the default signer).
    pub fn create_signing_suite(&self, options: &ProofOptions) -> Result<SigningSuite, ServiceError> {
        let options = self.effective_options(options)?;
        let key_id = options.signing_key_identifier()?;
        let key = self.key_store.key_pair(key_id)?;
        Ok(SigningSuite::new(self.suite, key, key_id, options.signing_date()))
    }

    /// Sign a credential. The input is not modified.
    pub async fn sign(&self, credential: &Value, options: &ProofOptions) -> Result<Value, ServiceError> {
        let options = self.effective_options(options)?;
        let suite = self.create_signing_suite(&options)?;
        let purpose = Purpose::from_options(&options);

        match issue(credential, &suite, &purpose, &self.loader).await {
            Ok(signed) => {
                tracing::info!(
                    verification_method = %suite.verification_method,
                    credential_id = id_of(&signed),
                    suite = %self.suite,
                    "credential signed"
                );
                Ok(signed)
            }
            Err(e) => {
                tracing::error!(
                    verification_method = %suite.verification_method,
                    error = %e,
                    "credential signing failed"
                );
                Err(e.into())
            }
        }
    }

    /// Sign a presentation for authentication. `options.challenge` is
    /// required, and the key's controller must list it under
    /// `authentication`.
    pub async fn sign_presentation(
        &self,
        presentation: &Value,
        options: &ProofOptions,
    ) -> Result<Value, ServiceError> {
        if options.challenge().is_none() {
            return Err(ServiceError::Configuration(
                "a challenge is required to sign a presentation".into(),
            ));
        }
        let options = self.effective_options(&options.with_proof_purpose(ProofPurpose::Authentication))?;
        let suite = self.create_signing_suite(&options)?;
        let purpose = Purpose::from_options(&options);

        let key = self.loader.document(&suite.verification_method).await?;
        if !purpose.is_authorized(&key, &self.loader).await? {
            tracing::error!(
                verification_method = %suite.verification_method,
                "key is not an authentication method"
            );
            return Err(ServiceError::Configuration(format!(
                "{} is not listed under authentication by its controller",
                suite.verification_method
            )));
        }

        match vcsign_ldp::sign_presentation(presentation, &suite, &purpose, &self.loader).await {
            Ok(signed) => {
                tracing::info!(
                    verification_method = %suite.verification_method,
                    presentation_id = id_of(&signed),
                    "presentation signed"
                );
                Ok(signed)
            }
            Err(e) => {
                tracing::error!(
                    verification_method = %suite.verification_method,
                    error = %e,
                    "presentation signing failed"
                );
                Err(e.into())
            }
        }
    }

    /// Wrap an optional credential in a new presentation and sign it.
    ///
    /// The envelope also carries the credentials examples and JWS 2020
    /// contexts, both pinned.
    pub async fn create_and_sign_presentation(
        &self,
        credential: Option<&Value>,
        presentation_id: &str,
        holder: &str,
        options: &ProofOptions,
    ) -> Result<Value, ServiceError> {
        let credentials: Vec<Value> = credential.into_iter().cloned().collect();
        let mut presentation = create_presentation(&credentials, Some(presentation_id), Some(holder));
        if let Some(Value::Array(contexts)) = presentation.get_mut("@context") {
            contexts.push(Value::from(CREDENTIALS_EXAMPLES_V1_URL));
            contexts.push(Value::from(JWS_2020_LEGACY_URL));
        }
        self.sign_presentation(&presentation, options).await
    }

    /// Verify a credential against the key named in `options` (or the
    /// default signer).
    pub async fn verify(
        &self,
        credential: &Value,
        options: &ProofOptions,
    ) -> Result<VerificationResult, ServiceError> {
        let options = self.effective_options(options)?;
        let purpose = Purpose::from_options(&options);
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

        tracing::info!(
            credential_id = id_of(credential),
            verified = result.verified,
            "credential verified"
        );
        Ok(result)
    }

    /// Verify a presentation's authentication proof and its credentials.
    pub async fn verify_presentation(
        &self,
        presentation: &Value,
        options: &ProofOptions,
    ) -> Result<VerificationResult, ServiceError> {
        let options = self.effective_options(&options.with_proof_purpose(ProofPurpose::Authentication))?;
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

        tracing::info!(
            presentation_id = id_of(presentation),
            verified = result.verified,
            "presentation verified"
        );
        Ok(result)
    }

    /// Public view of a key held by this issuer.
    pub fn create_key(&self, id: &str) -> Result<VerificationKey, ServiceError> {
        Ok(self.key_store.get_key(id)?.public_view())
    }

    /// Issue the demo credential to the holder of a signed request
    /// presentation.
    ///
    /// Unless `skip_verification` is set, the presentation must verify
    /// against the verification method and challenge named in its own proof.
    pub async fn request_demo_credential(
        &self,
        presentation: &Value,
        skip_verification: bool,
    ) -> Result<Value, ServiceError> {
        if !skip_verification {
            let proof = first_proof(presentation)?;
            let verification_method = get_proof_property_str(proof, "verificationMethod")?;
            let challenge = get_proof_property_str(proof, "challenge")?;
            let options = ProofOptions::builder()
                .verification_method(verification_method)
                .proof_purpose(ProofPurpose::Authentication)
                .challenge(challenge)
                .build()?;

            let result = self.verify_presentation(presentation, &options).await?;
            if !result.verified {
                let reason = result
                    .error
                    .unwrap_or_else(|| "presentation did not verify".to_string());
                tracing::warn!(reason = %reason, "demo credential request rejected");
                return Err(ServiceError::InvalidCredentialRequest(reason));
            }
        }

        let holder = presentation
            .get("holder")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ServiceError::InvalidCredentialRequest("presentation names no holder".into())
            })?;

        let credential = stamp_demo_credential(
            &self.demo_template,
            holder,
            get_controller(&self.default_signer),
        )?;
        let options = ProofOptions::for_verification_method(self.default_signer.as_str())?;
        let signed = self.sign(&credential, &options).await?;
        tracing::info!(holder = holder, "demo credential issued");
        Ok(signed)
    }

    fn effective_options(&self, options: &ProofOptions) -> Result<ProofOptions, ServiceError> {
        match options.verification_method() {
            Some(_) => Ok(options.clone()),
            None => Ok(options.with_verification_method(self.default_signer.as_str())?),
        }
    }
}

impl std::fmt::Debug for IssuerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuerService")
            .field("default_signer", &self.default_signer)
            .field("suite", &self.suite)
            .field("key_store", &self.key_store)
            .finish_non_exhaustive()
    }
}

/// Configuration for an [`IssuerService`].
#[derive(Default)]
pub struct IssuerServiceBuilder {
    documents: Vec<DidDocument>,
    signing_identifier: Option<String>,
    suite: SuiteKind,
    fetcher: Option<Arc<dyn DocumentFetcher>>,
    contexts: ContextRegistry,
    demo_template: Option<Value>,
}

impl IssuerServiceBuilder {
    /// Unlocked DID documents. Their assertion keys become signing keys and
    /// their public views are preloaded into the loader.
    pub fn documents(mut self, documents: Vec<DidDocument>) -> Self {
        self.documents.extend(documents);
        self
    }

    pub fn document(mut self, document: DidDocument) -> Self {
        self.documents.push(document);
        self
    }

    pub fn signing_identifier(mut self, id: impl Into<String>) -> Self {
        self.signing_identifier = Some(id.into());
        self
    }

    pub fn suite(mut self, suite: SuiteKind) -> Self {
        self.suite = suite;
        self
    }

    /// Network fallback; [`HttpFetcher`] when unset.
    pub fn fetcher(mut self, fetcher: Arc<dyn DocumentFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Additional context, registered over the pinned set.
    pub fn context(mut self, url: impl Into<String>, document: Value) -> Self {
        self.contexts = self.contexts.add_context(url, document);
        self
    }

    pub fn demo_template(mut self, template: Value) -> Self {
        self.demo_template = Some(template);
        self
    }

    pub fn build(self) -> Result<IssuerService, ServiceError> {
        if self.documents.is_empty() {
            return Err(ServiceError::Configuration(
                "at least one unlocked DID document is required".into(),
            ));
        }
        let key_store = KeyStore::from_documents(&self.documents)?;

        let default_signer = match self.signing_identifier {
            Some(id) => {
                key_store.key_pair(&id)?;
                id
            }
            None => {
                let id = key_store
                    .first_key_id()
                    .ok_or_else(|| {
                        ServiceError::Configuration(
                            "unlocked DID documents carry no assertion keys".into(),
                        )
                    })?
                    .to_string();
                if self.documents.len() > 1 {
                    tracing::warn!(
                        default_signer = %id,
                        documents = self.documents.len(),
                        "no signing identifier given, using the first key of the first document"
                    );
                }
                id
            }
        };

        let fetcher: Arc<dyn DocumentFetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::new()),
        };
        let loader = service_loader(&self.documents, self.contexts, fetcher)?;

        tracing::info!(
            default_signer = %default_signer,
            keys = key_store.len(),
            suite = %self.suite,
            "issuer service ready"
        );

        Ok(IssuerService {
            key_store,
            loader,
            default_signer,
            suite: self.suite,
            demo_template: self.demo_template.unwrap_or_else(default_demo_template),
        })
    }
}

pub(crate) fn id_of(document: &Value) -> &str {
    document.get("id").and_then(Value::as_str).unwrap_or_default()
}

fn first_proof(presentation: &Value) -> Result<&Value, ServiceError> {
    let proof = match presentation.get("proof") {
        Some(Value::Array(proofs)) => proofs.first(),
        Some(proof @ Value::Object(_)) => Some(proof),
        _ => None,
    };
    proof.ok_or_else(|| ServiceError::InvalidCredentialRequest("presentation carries no proof".into()))
}
