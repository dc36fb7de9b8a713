use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use super::Context;
use crate::output::{decrypted_block, encrypted_block, failure, rule, success};
use crate::session::Session;

const QUIT_WORDS: [&str; 3] = ["quit", "exit", "q"];

#[derive(Args)]
pub struct InteractiveArgs {
    /// Write the session history to this JSON file on exit
    #[arg(long)]
    pub export: Option<PathBuf>,
}

pub async fn run(args: InteractiveArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open_session()?;
    let mut out = std::io::stdout();

    writeln!(out, "EMOTION CIPHER - Decoding Feelings through Code")?;
    rule(&mut out)?;
    writeln!(out, "Interactive Mode - Enter your own messages!")?;
    writeln!(out, "Type 'quit' or 'exit' to stop.\n")?;
    write_status(&session, &mut out)?;

    let stdin = BufReader::new(tokio::io::stdin());
    let processed = run_loop(&mut session, stdin, &mut out).await?;

    writeln!(out, "\n{}", "-".repeat(40))?;
    writeln!(out, "Session Summary:")?;
    writeln!(out, "  Messages processed: {processed}")?;
    let stats = session.statistics();
    writeln!(out, "  Total operations: {}", stats.total_operations)?;
    writeln!(out, "  Successful: {}", stats.successful_operations)?;

    if let Some(path) = args.export {
        session.export(&path)?;
    }
    Ok(())
}

pub fn write_status(session: &Session, out: &mut impl Write) -> Result<()> {
    let status = session.status();
    writeln!(out, "System Status:")?;
    writeln!(out, "  Encryption: ✓ Ready ({})", status.encryption.algorithm)?;
    match status.emotion_analysis.provider {
        Some(provider) => writeln!(out, "  Emotion Analysis: ✓ Available ({provider})")?,
        None => writeln!(out, "  Emotion Analysis: ✗ Not configured")?,
    }
    Ok(())
}

/// Round-trip every line from `input` until a quit word, an empty line or
/// end of input. Returns how many messages were processed.
pub async fn run_loop<R, W>(session: &mut Session, input: R, out: &mut W) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut count = 0;

    loop {
        writeln!(out, "\n{}", "-".repeat(40))?;
        write!(out, "Enter your message: ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let message = line.trim();
        if message.is_empty() || QUIT_WORDS.contains(&message.to_lowercase().as_str()) {
            break;
        }

        count += 1;
        writeln!(out, "\nProcessing Message #{count}:")?;
        rule(out)?;

        let (encrypted, decrypted) = session.round_trip(message).await;
        encrypted_block(out, message, &encrypted)?;
        if let Some(decrypted) = &decrypted {
            decrypted_block(out, decrypted)?;
        }

        match (encrypted.failure(), decrypted.as_ref().and_then(|d| d.failure())) {
            (None, None) => success(out, "Processing completed successfully!")?,
            (Some(failed), _) | (None, Some(failed)) => {
                failure(out, format_args!("Error: {}", failed.message))?
            }
        }
    }

    Ok(count)
}
