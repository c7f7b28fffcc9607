//! `vcsign init`: Write a default configuration file.

use std::path::Path;

use clap::Args;

use crate::config::VcsignConfig;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file.
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: &InitArgs, config_path: &Path) -> anyhow::Result<()> {
    if config_path.exists() && !args.force {
        anyhow::bail!(
            "configuration file already exists at {} (use --force to overwrite)",
            config_path.display()
        );
    }

    VcsignConfig::default().save(config_path)?;
    tracing::info!(path = %config_path.display(), "wrote default config");
    println!("Initialized vcsign configuration at {}", config_path.display());
    println!("Run 'vcsign keygen --out issuer.json' and list the file under [issuer] documents.");
    Ok(())
}
