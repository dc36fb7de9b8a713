use anyhow::{Context as _, Result};
use emocipher::KeyStore;
use serde::Serialize;

use super::Context;
use crate::output::{print_json, success};

#[derive(Serialize)]
struct KeyInfo {
    private_key: String,
    public_key: String,
    bits: usize,
    fingerprint: String,
    max_plaintext_bytes: usize,
}

/// What `ensure_key_pair` is about to do with the files on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeySetup {
    Load,
    RestorePublic,
    Generate,
}

impl KeySetup {
    fn detect(store: &KeyStore) -> Self {
        match (store.private_key_path().exists(), store.public_key_path().exists()) {
            (true, true) => KeySetup::Load,
            (true, false) => KeySetup::RestorePublic,
            // A lone public key is refused by ensure_key_pair before anything is printed
            (false, _) => KeySetup::Generate,
        }
    }

    fn message(self) -> &'static str {
        match self {
            KeySetup::Load => "Loaded existing RSA keys",
            KeySetup::RestorePublic => "Loaded existing private key and restored its public key",
            KeySetup::Generate => "Generated new RSA keys",
        }
    }
}

/// Load the configured key pair, generating it on first use
pub fn run(ctx: &Context) -> Result<()> {
    let config = ctx.config()?;
    let store = config.keys.store();
    let setup = KeySetup::detect(&store);
    let keys = store.ensure_key_pair().context("Failed to set up encryption keys")?;

    let info = KeyInfo {
        private_key: store.private_key_path().display().to_string(),
        public_key: store.public_key_path().display().to_string(),
        bits: keys.bits(),
        fingerprint: keys.fingerprint(),
        max_plaintext_bytes: keys.max_plaintext_len(),
    };

    if ctx.json_output {
        return print_json(&info);
    }

    let mut out = std::io::stdout().lock();
    success(&mut out, setup.message())?;
    println!("  Private key:   {}", info.private_key);
    println!("  Public key:    {}", info.public_key);
    println!("  Key size:      {} bits", info.bits);
    println!("  Fingerprint:   {}", info.fingerprint);
    println!("  Max plaintext: {} bytes", info.max_plaintext_bytes);
    Ok(())
}
