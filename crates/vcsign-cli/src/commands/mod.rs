pub mod demo;
pub mod init;
pub mod issue;
pub mod keygen;
pub mod present;
pub mod resolve;
pub mod verify;

use std::path::{Path, PathBuf};

use serde_json::Value;
use vcsign::{IssuerMembershipRegistry, IssuerService, VerifierService};

use crate::config::{load_documents, read_json_file, VcsignConfig};

/// JSON given inline or as a path to a file.
pub fn read_json_arg(arg: &str) -> anyhow::Result<Value> {
    let path = Path::new(arg);
    if path.exists() {
        read_json_file(path)
    } else {
        serde_json::from_str(arg).map_err(|e| anyhow::anyhow!("invalid JSON argument: {}", e))
    }
}

/// Print `value` as pretty JSON, to `out` when given, otherwise stdout.
pub fn write_json(value: &impl serde::Serialize, out: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => {
            std::fs::write(path, json + "\n")?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Issuer from the configuration; `documents` replaces the configured
/// documents when non-empty.
pub fn build_issuer(config: &VcsignConfig, documents: &[PathBuf]) -> anyhow::Result<IssuerService> {
    let paths = if documents.is_empty() {
        &config.issuer.documents[..]
    } else {
        documents
    };
    if paths.is_empty() {
        anyhow::bail!("no unlocked DID documents: pass --document or set issuer.documents");
    }

    let mut builder = IssuerService::builder()
        .documents(load_documents(paths)?)
        .suite(config.issuer.suite)
        .fetcher(config.fetcher());
    if let Some(ref id) = config.issuer.signing_identifier {
        builder = builder.signing_identifier(id.clone());
    }
    if let Some(ref template) = config.issuer.demo_template {
        builder = builder.demo_template(read_json_file(template)?);
    }
    for (url, document) in config.contexts()? {
        builder = builder.context(url, document);
    }
    Ok(builder.build()?)
}

pub fn build_verifier(config: &VcsignConfig) -> anyhow::Result<VerifierService> {
    let mut builder = VerifierService::builder()
        .documents(load_documents(&config.verifier.documents)?)
        .fetcher(config.fetcher());
    for (url, document) in config.contexts()? {
        builder = builder.context(url, document);
    }
    Ok(builder.build()?)
}

/// Registry from `source` (or the configured one): an http(s) URL is
/// fetched, anything else is read as a file.
pub async fn load_registry(
    source: Option<&str>,
    config: &VcsignConfig,
) -> anyhow::Result<IssuerMembershipRegistry> {
    let Some(source) = source.or(config.verifier.registry.as_deref()) else {
        tracing::warn!("no issuer registry configured, no issuer will be valid");
        return Ok(IssuerMembershipRegistry::new());
    };

    if source.starts_with("https://") || source.starts_with("http://") {
        let fetcher = config.fetcher();
        Ok(IssuerMembershipRegistry::fetch(source, fetcher.as_ref()).await?)
    } else {
        let contents = std::fs::read_to_string(source)
            .map_err(|e| anyhow::anyhow!("cannot read registry {}: {}", source, e))?;
        Ok(IssuerMembershipRegistry::from_json(&contents)?)
    }
}
