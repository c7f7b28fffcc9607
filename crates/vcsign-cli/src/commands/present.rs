//! `vcsign present`: Wrap a credential in a presentation and sign it.

use std::path::PathBuf;

use clap::Args;
use uuid::Uuid;
use vcsign::ProofOptions;

#[derive(Args, Debug)]
pub struct PresentArgs {
    /// Credential JSON to embed (as string or path to file).
    #[arg(short = 'i', long)]
    pub credential: Option<String>,

    /// Holder DID.
    #[arg(long)]
    pub holder: String,

    /// Challenge supplied by the verifier.
    #[arg(long)]
    pub challenge: String,

    /// Domain supplied by the verifier.
    #[arg(long)]
    pub domain: Option<String>,

    /// Presentation id; a fresh urn:uuid when omitted.
    #[arg(long)]
    pub id: Option<String>,

    /// Key identifier to sign with (defaults to the configured signer).
    #[arg(long)]
    pub verification_method: Option<String>,

    /// Unlocked DID document files, replacing issuer.documents.
    #[arg(long = "document")]
    pub documents: Vec<PathBuf>,

    /// Write the presentation to this file instead of stdout.
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub async fn run(args: &PresentArgs, config: &crate::config::VcsignConfig) -> anyhow::Result<()> {
    let credential = args
        .credential
        .as_deref()
        .map(super::read_json_arg)
        .transpose()?;
    let issuer = super::build_issuer(config, &args.documents)?;

    let mut options = ProofOptions::builder().challenge(args.challenge.clone());
    if let Some(ref domain) = args.domain {
        options = options.domain(domain.clone());
    }
    if let Some(ref vm) = args.verification_method {
        options = options.verification_method(vm.clone());
    }

    let id = args
        .id
        .clone()
        .unwrap_or_else(|| format!("urn:uuid:{}", Uuid::now_v7()));
    let presentation = issuer
        .create_and_sign_presentation(credential.as_ref(), &id, &args.holder, &options.build()?)
        .await?;
    super::write_json(&presentation, args.out.as_deref())
}
