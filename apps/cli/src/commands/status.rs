use anyhow::Result;

use super::Context;
use crate::output::print_json;

pub fn run(ctx: &Context) -> Result<()> {
    let session = ctx.open_session()?;
    let status = session.status();

    if ctx.json_output {
        return print_json(&status);
    }

    let ready = |ok: bool, yes: &'static str, no: &'static str| if ok { yes } else { no };
    println!("System Status:");
    println!(
        "  Encryption: {} ({}, {})",
        ready(status.encryption.keys_ready, "✓ Ready", "✗ Not ready"),
        status.encryption.algorithm,
        status.encryption.padding
    );
    println!("  Fingerprint: {}", status.encryption.fingerprint);
    println!(
        "  Emotion Analysis: {}",
        match &status.emotion_analysis.provider {
            Some(provider) => format!("✓ Available ({provider})"),
            None => "✗ Not configured".to_string(),
        }
    );
    Ok(())
}
