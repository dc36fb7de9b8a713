use anyhow::{Result, bail};
use clap::Args;
use emocipher::{LabelRequest, ProcessingResult, RevealLabel};

use super::Context;
use crate::output::{analysis_details, print_json};

#[derive(Args)]
pub struct EncryptArgs {
    /// Message to encrypt
    pub message: String,

    /// Skip emotion analysis
    #[arg(long)]
    pub no_label: bool,
}

#[derive(Args)]
pub struct DecryptArgs {
    /// Base64 ciphertext produced by `encrypt`
    pub ciphertext: String,

    /// Attach a previously detected emotion label
    #[arg(long, conflicts_with = "relabel")]
    pub label: Option<String>,

    /// Analyze the decrypted message again
    #[arg(long)]
    pub relabel: bool,
}

pub async fn encrypt(args: EncryptArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open_session()?;
    let label = if args.no_label { LabelRequest::Skip } else { LabelRequest::Classify };

    let result = session.encrypt(&args.message, label).await;
    report(&result, ctx, |result| {
        if let Some(label) = result.emotion_label() {
            println!("Detected Emotion: {label}");
            analysis_details(&mut std::io::stdout(), result.emotion_analysis()).ok();
        }
        if let Some(encrypted) = result.encrypted_message() {
            println!("{encrypted}");
        }
    })
}

pub async fn decrypt(args: DecryptArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open_session()?;
    let label = match (args.label, args.relabel) {
        (Some(known), _) => RevealLabel::Known(known),
        (None, true) => RevealLabel::Reclassify,
        (None, false) => RevealLabel::None,
    };

    let result = session.decrypt(&args.ciphertext, label).await;
    report(&result, ctx, |result| {
        if let Some(label) = result.emotion_label() {
            println!("Detected Emotion: {label}");
            analysis_details(&mut std::io::stdout(), result.emotion_analysis()).ok();
        }
        if let Some(message) = result.original_message() {
            println!("{message}");
        }
    })
}

fn report(result: &ProcessingResult, ctx: &Context, human: impl FnOnce(&ProcessingResult)) -> Result<()> {
    if ctx.json_output {
        print_json(result)?;
    }

    match result {
        ProcessingResult::Ok(_) => {
            if !ctx.json_output {
                human(result);
            }
            Ok(())
        }
        ProcessingResult::Err(failure) => bail!("{}", failure.message),
    }
}
