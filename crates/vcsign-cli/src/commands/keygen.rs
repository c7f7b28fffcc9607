//! `vcsign keygen`: Generate an Ed25519 key as an unlocked did:key document.

use std::path::PathBuf;

use clap::Args;
use vcsign_crypto::KeyPair;
use vcsign_loader::{did_key_identifiers, unlocked_did_key_document};

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// 32-byte seed as hex, for reproducible keys.
    #[arg(long)]
    pub seed_hex: Option<String>,

    /// Write the document to this file instead of stdout.
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &KeygenArgs) -> anyhow::Result<()> {
    let key = match args.seed_hex {
        Some(ref seed_hex) => {
            let bytes = hex::decode(seed_hex.trim())
                .map_err(|e| anyhow::anyhow!("invalid seed hex: {}", e))?;
            let seed: [u8; 32] = bytes
                .as_slice()
                .try_into()
                .map_err(|_| anyhow::anyhow!("seed must be 32 bytes, got {}", bytes.len()))?;
            KeyPair::from_seed(&seed)
        }
        None => KeyPair::generate(),
    };

    let (did, key_id) = did_key_identifiers(&key.public_key());
    let document = unlocked_did_key_document(&key);
    super::write_json(&document, args.out.as_deref())?;

    eprintln!("DID: {did}");
    eprintln!("Key: {key_id}");
    Ok(())
}
