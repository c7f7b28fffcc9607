//! `vcsign request-demo`: Answer a signed demo request.

use std::path::PathBuf;

use clap::Args;

#[derive(Args, Debug)]
pub struct RequestDemoArgs {
    /// Request presentation JSON (as string or path to file).
    #[arg(short = 'i', long)]
    pub presentation: String,

    /// Issue without verifying the request presentation.
    #[arg(long)]
    pub skip_verification: bool,

    /// Unlocked DID document files, replacing issuer.documents.
    #[arg(long = "document")]
    pub documents: Vec<PathBuf>,

    /// Write the credential to this file instead of stdout.
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub async fn run(args: &RequestDemoArgs, config: &crate::config::VcsignConfig) -> anyhow::Result<()> {
    let presentation = super::read_json_arg(&args.presentation)?;
    let issuer = super::build_issuer(config, &args.documents)?;
    let credential = issuer
        .request_demo_credential(&presentation, args.skip_verification)
        .await?;
    super::write_json(&credential, args.out.as_deref())
}
