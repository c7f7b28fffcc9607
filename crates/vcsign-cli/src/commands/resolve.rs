//! `vcsign resolve`: Resolve a context URL, DID or key identifier.

use clap::Args;

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Context URL, DID or key identifier.
    pub url: String,
}

pub async fn run(args: &ResolveArgs, config: &crate::config::VcsignConfig) -> anyhow::Result<()> {
    let verifier = super::build_verifier(config)?;
    let remote = verifier.loader().resolve(&args.url).await?;
    super::write_json(&remote, None)
}
