//! CLI configuration loading and management.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use vcsign::{DidDocument, SuiteKind};
use vcsign_loader::{DocumentFetcher, HttpFetcher, OfflineFetcher};

/// Full configuration for the vcsign CLI.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VcsignConfig {
    /// Signing settings.
    #[serde(default)]
    pub issuer: IssuerConfig,

    /// Verification settings.
    #[serde(default)]
    pub verifier: VerifierConfig,

    /// Document loader settings.
    #[serde(default)]
    pub loader: LoaderConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IssuerConfig {
    /// Unlocked DID document files.
    #[serde(default)]
    pub documents: Vec<PathBuf>,
    /// Key identifier that signs when none is given on the command line.
    #[serde(default)]
    pub signing_identifier: Option<String>,
    /// Proof suite (Ed25519Signature2020, JsonWebSignature2020).
    #[serde(default)]
    pub suite: SuiteKind,
    /// Demo credential template file.
    #[serde(default)]
    pub demo_template: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VerifierConfig {
    /// Public DID document files preloaded ahead of DID resolution.
    #[serde(default)]
    pub documents: Vec<PathBuf>,
    /// Issuer membership registry: a file path or an http(s) URL.
    #[serde(default)]
    pub registry: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoaderConfig {
    /// Refuse network fetches.
    #[serde(default)]
    pub offline: bool,
    /// Extra JSON-LD contexts served from local files.
    #[serde(default)]
    pub contexts: Vec<ContextFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextFile {
    pub url: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl VcsignConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: VcsignConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Network fallback for the document loader.
    pub fn fetcher(&self) -> Arc<dyn DocumentFetcher> {
        if self.loader.offline {
            Arc::new(OfflineFetcher)
        } else {
            Arc::new(HttpFetcher::new())
        }
    }

    /// Extra contexts read from their files.
    pub fn contexts(&self) -> anyhow::Result<Vec<(String, Value)>> {
        self.loader
            .contexts
            .iter()
            .map(|entry| Ok((entry.url.clone(), read_json_file(&entry.path)?)))
            .collect()
    }
}

/// Parse DID documents from files.
pub fn load_documents(paths: &[PathBuf]) -> anyhow::Result<Vec<DidDocument>> {
    paths
        .iter()
        .map(|path| {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
            DidDocument::from_json(&contents)
                .map_err(|e| anyhow::anyhow!("invalid DID document {}: {}", path.display(), e))
        })
        .collect()
}

pub fn read_json_file(path: &Path) -> anyhow::Result<Value> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
    serde_json::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("invalid JSON in {}: {}", path.display(), e))
}
