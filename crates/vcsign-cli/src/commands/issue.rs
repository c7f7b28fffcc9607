//! `vcsign issue`: Sign a credential.

use std::path::PathBuf;

use clap::Args;
use vcsign::ProofOptions;

#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Credential JSON (as string or path to file).
    #[arg(short = 'i', long)]
    pub credential: String,

    /// Key identifier to sign with (defaults to the configured signer).
    #[arg(long)]
    pub verification_method: Option<String>,

    /// Proof date (RFC 3339); now when omitted.
    #[arg(long)]
    pub created: Option<String>,

    /// Unlocked DID document files, replacing issuer.documents.
    #[arg(long = "document")]
    pub documents: Vec<PathBuf>,

    /// Write the signed credential to this file instead of stdout.
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub async fn run(args: &IssueArgs, config: &crate::config::VcsignConfig) -> anyhow::Result<()> {
    let credential = super::read_json_arg(&args.credential)?;
    let issuer = super::build_issuer(config, &args.documents)?;

    let mut options = ProofOptions::builder();
    if let Some(ref vm) = args.verification_method {
        options = options.verification_method(vm.clone());
    }
    if let Some(ref created) = args.created {
        options = options.created(created.clone());
    }

    let signed = issuer.sign(&credential, &options.build()?).await?;
    super::write_json(&signed, args.out.as_deref())
}
