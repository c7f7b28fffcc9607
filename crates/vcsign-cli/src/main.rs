//! vcsign CLI: command-line interface for issuing and verifying
//! W3C Verifiable Credentials.
//!
//! Subcommands: init, keygen, issue, present, verify, verify-presentation,
//! request-demo, resolve.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::{LoggingConfig, VcsignConfig};

/// vcsign: sign and verify Verifiable Credentials.
#[derive(Parser, Debug)]
#[command(name = "vcsign", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, global = true, default_value = "vcsign.toml")]
    config: PathBuf,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Never fetch documents over the network.
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration file.
    Init(commands::init::InitArgs),
    /// Generate an Ed25519 key as an unlocked did:key document.
    Keygen(commands::keygen::KeygenArgs),
    /// Sign a credential.
    Issue(commands::issue::IssueArgs),
    /// Wrap a credential in a presentation and sign it.
    Present(commands::present::PresentArgs),
    /// Verify a credential and check its issuer.
    Verify(commands::verify::VerifyArgs),
    /// Verify a presentation and check its credentials' issuers.
    VerifyPresentation(commands::verify::VerifyPresentationArgs),
    /// Answer a signed demo request with a demo credential.
    RequestDemo(commands::demo::RequestDemoArgs),
    /// Resolve a context URL, DID or key identifier.
    Resolve(commands::resolve::ResolveArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = VcsignConfig::load(&cli.config)?;
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if cli.offline {
        config.loader.offline = true;
    }
    init_tracing(&config.logging);

    match &cli.command {
        Commands::Init(args) => commands::init::run(args, &cli.config),
        Commands::Keygen(args) => commands::keygen::run(args),
        Commands::Issue(args) => commands::issue::run(args, &config).await,
        Commands::Present(args) => commands::present::run(args, &config).await,
        Commands::Verify(args) => commands::verify::run(args, &config).await,
        Commands::VerifyPresentation(args) => commands::verify::run_presentation(args, &config).await,
        Commands::RequestDemo(args) => commands::demo::run(args, &config).await,
        Commands::Resolve(args) => commands::resolve::run(args, &config).await,
    }
}

/// Logs go to stderr so that command output on stdout stays valid JSON.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
