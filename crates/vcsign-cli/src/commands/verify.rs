//! `vcsign verify` and `vcsign verify-presentation`.

use clap::Args;
use vcsign::{ProofOptions, VerifyCredentialRequest, VerifyOutcome, VerifyPresentationRequest};

use crate::config::VcsignConfig;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Credential JSON (as string or path to file).
    #[arg(short = 'i', long)]
    pub credential: String,

    /// Issuer registry file or URL (overrides verifier.registry).
    #[arg(short, long)]
    pub registry: Option<String>,

    /// Only accept proofs made with this key.
    #[arg(long)]
    pub verification_method: Option<String>,
}

#[derive(Args, Debug)]
pub struct VerifyPresentationArgs {
    /// Presentation JSON (as string or path to file).
    #[arg(short = 'i', long)]
    pub presentation: String,

    /// Challenge the presentation must be bound to.
    #[arg(long)]
    pub challenge: Option<String>,

    /// Domain the presentation must be bound to.
    #[arg(long)]
    pub domain: Option<String>,

    /// Issuer registry file or URL (overrides verifier.registry).
    #[arg(short, long)]
    pub registry: Option<String>,
}

pub async fn run(args: &VerifyArgs, config: &VcsignConfig) -> anyhow::Result<()> {
    let credential = super::read_json_arg(&args.credential)?;
    let registry = super::load_registry(args.registry.as_deref(), config).await?;
    let verifier = super::build_verifier(config)?;

    let mut options = ProofOptions::builder();
    if let Some(ref vm) = args.verification_method {
        options = options.verification_method(vm.clone());
    }
    let request = VerifyCredentialRequest::new(credential, registry).with_options(options.build()?);

    let outcome = verifier.verify(&request).await?;
    report("Credential", &outcome)
}

pub async fn run_presentation(args: &VerifyPresentationArgs, config: &VcsignConfig) -> anyhow::Result<()> {
    let presentation = super::read_json_arg(&args.presentation)?;
    let registry = super::load_registry(args.registry.as_deref(), config).await?;
    let verifier = super::build_verifier(config)?;

    let mut options = ProofOptions::builder();
    if let Some(ref challenge) = args.challenge {
        options = options.challenge(challenge.clone());
    }
    if let Some(ref domain) = args.domain {
        options = options.domain(domain.clone());
    }
    let request =
        VerifyPresentationRequest::new(presentation, registry).with_options(options.build()?);

    let outcome = verifier.verify_presentation(&request).await?;
    report("Presentation", &outcome)
}

fn report(what: &str, outcome: &VerifyOutcome) -> anyhow::Result<()> {
    super::write_json(outcome, None)?;
    let verified = if outcome.verified { "VERIFIED" } else { "NOT VERIFIED" };
    let valid = if outcome.valid { "trusted issuer" } else { "untrusted issuer" };
    eprintln!("{what} {verified} ({valid})");
    if !outcome.verified {
        anyhow::bail!(
            "{} verification failed: {}",
            what.to_lowercase(),
            outcome.error.as_deref().unwrap_or("unknown reason")
        );
    }
    Ok(())
}
