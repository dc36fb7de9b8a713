use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use emocipher::{LabelRequest, RevealLabel};

use super::Context;
use super::interactive::write_status;
use crate::output::{decrypted_block, encrypted_block, failure, rule, success};
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DemoMode {
    /// The five showcase examples
    #[default]
    Full,
    /// A single test message
    Quick,
    /// Five short messages processed as a batch
    Batch,
}

#[derive(Args)]
pub struct DemoArgs {
    #[arg(value_enum, default_value_t = DemoMode::Full)]
    pub mode: DemoMode,

    /// Write the session history to this JSON file when done
    #[arg(long)]
    pub export: Option<PathBuf>,
}

const EXAMPLES: [(&str, &str); 5] = [
    (
        "Example 1 - Mixed Emotions",
        "Feeling ecstatic about joining the new AI research team, though a bit anxious about \
         the deadlines ahead.",
    ),
    (
        "Example 2 - Negative Emotions",
        "I can't believe I failed that test again. I'm so disappointed and frustrated right now.",
    ),
    (
        "Example 3 - Positive Emotions",
        "Finally got the job offer! I'm thrilled and can't wait to start this new journey.",
    ),
    (
        "Additional Example - Love & Excitement",
        "I absolutely love this new technology! It's going to revolutionize everything we do.",
    ),
    (
        "Additional Example - Worry & Stress",
        "I'm really worried about the presentation tomorrow. What if something goes wrong?",
    ),
];

const QUICK_MESSAGE: &str = "This is a quick test of the emotion cipher system!";

const BATCH_MESSAGES: [&str; 5] = [
    "I'm excited about machine learning!",
    "This encryption is very secure.",
    "Artificial intelligence is fascinating.",
    "I'm worried about data privacy.",
    "This system works perfectly!",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoSummary {
    pub total: usize,
    pub successful: usize,
}

impl DemoSummary {
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.successful as f64 / self.total as f64 * 100.0
    }
}

pub async fn run(args: DemoArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open_session()?;
    let mut out = std::io::stdout();

    run_demo(&mut session, args.mode, &mut out).await?;

    if let Some(path) = args.export {
        session.export(&path)?;
    }
    Ok(())
}

pub async fn run_demo(session: &mut Session, mode: DemoMode, out: &mut impl Write) -> Result<DemoSummary> {
    match mode {
        DemoMode::Full => full(session, out).await,
        DemoMode::Quick => quick(session, out).await,
        DemoMode::Batch => batch(session, out).await,
    }
}

/// Round trip one message, returning whether both halves succeeded
async fn showcase(session: &mut Session, message: &str, out: &mut impl Write) -> Result<bool> {
    let (encrypted, decrypted) = session.round_trip(message).await;
    encrypted_block(out, message, &encrypted)?;

    let Some(decrypted) = decrypted else {
        return Ok(false);
    };
    decrypted_block(out, &decrypted)?;
    Ok(decrypted.is_success())
}

async fn full(session: &mut Session, out: &mut impl Write) -> Result<DemoSummary> {
    writeln!(out, "EMOTION CIPHER - Decoding Feelings through Code")?;
    rule(out)?;
    writeln!(out, "Hardcoded Examples Demo")?;
    rule(out)?;
    write_status(session, out)?;
    writeln!(out, "\nProcessing hardcoded examples...")?;

    let mut summary = DemoSummary { total: EXAMPLES.len(), successful: 0 };
    for (category, message) in EXAMPLES {
        writeln!(out, "\n{category}")?;
        rule(out)?;
        if showcase(session, message, out).await? {
            summary.successful += 1;
            success(out, "Processing completed successfully!")?;
        } else {
            failure(out, "Processing failed")?;
        }
    }

    writeln!(out)?;
    rule(out)?;
    writeln!(out, "DEMO SUMMARY")?;
    rule(out)?;
    writeln!(out, "Total Examples: {}", summary.total)?;
    writeln!(out, "Successful: {}", summary.successful)?;
    writeln!(out, "Failed: {}", summary.total - summary.successful)?;
    writeln!(out, "Success Rate: {:.1}%", summary.success_rate())?;

    let stats = session.statistics();
    writeln!(out, "\nSystem Statistics:")?;
    writeln!(out, "  Total Operations: {}", stats.total_operations)?;
    writeln!(out, "  Successful Operations: {}", stats.successful_operations)?;
    Ok(summary)
}

async fn quick(session: &mut Session, out: &mut impl Write) -> Result<DemoSummary> {
    writeln!(out, "EMOTION CIPHER - Quick Test")?;
    rule(out)?;
    writeln!(out, "Testing with: {QUICK_MESSAGE:?}")?;

    let passed = showcase(session, QUICK_MESSAGE, out).await?;
    if passed {
        success(out, "Quick test passed!")?;
    } else {
        failure(out, "Quick test failed")?;
    }
    Ok(DemoSummary { total: 1, successful: usize::from(passed) })
}

async fn batch(session: &mut Session, out: &mut impl Write) -> Result<DemoSummary> {
    writeln!(out, "EMOTION CIPHER - Batch Processing Test")?;
    rule(out)?;
    writeln!(out, "Processing {} messages in batch...", BATCH_MESSAGES.len())?;

    let encrypted = session.encrypt_batch(&BATCH_MESSAGES, LabelRequest::Classify).await;

    let mut summary = DemoSummary { total: BATCH_MESSAGES.len(), successful: 0 };
    for (i, (message, encrypted)) in BATCH_MESSAGES.iter().zip(&encrypted).enumerate() {
        writeln!(out, "\nMessage {}/{}:", i + 1, BATCH_MESSAGES.len())?;
        encrypted_block(out, message, encrypted)?;
        let Some(processed) = encrypted.processed() else {
            continue;
        };

        let label = match processed.emotion_label.as_ref().and_then(|l| l.as_detected()) {
            Some(label) => RevealLabel::Known(label.to_string()),
            None => RevealLabel::None,
        };
        let decrypted = session.decrypt(&processed.encrypted_message, label).await;
        decrypted_block(out, &decrypted)?;
        if decrypted.is_success() {
            summary.successful += 1;
            success(out, "Success")?;
        }
    }

    writeln!(out, "\nBatch test completed!")?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Operation;
    use emocipher::{KeyStore, MessageProcessor};
    use tempfile::tempdir;

    fn session(dir: &std::path::Path) -> Session {
        // Examples are up to ~105 bytes, so they need a 2048-bit key
        let keys = KeyStore::new(dir).ensure_key_pair().unwrap();
        Session::new(MessageProcessor::new(keys))
    }

    #[tokio::test]
    async fn test_all_demo_modes_succeed_without_classifier() {
        let dir = tempdir().unwrap();
        let mut session = session(dir.path());
        let mut out = Vec::new();

        let full = run_demo(&mut session, DemoMode::Full, &mut out).await.unwrap();
        assert_eq!(full, DemoSummary { total: 5, successful: 5 });

        let quick = run_demo(&mut session, DemoMode::Quick, &mut out).await.unwrap();
        assert_eq!(quick, DemoSummary { total: 1, successful: 1 });

        let batch = run_demo(&mut session, DemoMode::Batch, &mut out).await.unwrap();
        assert_eq!(batch, DemoSummary { total: 5, successful: 5 });

        // Each message is one encrypt and one decrypt
        assert_eq!(session.statistics().successful_operations, 22);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Success Rate: 100.0%"));
        assert!(text.contains("Quick test passed!"));
        assert!(text.contains("Batch test completed!"));
    }

    #[tokio::test]
    async fn test_full_demo_headings_name_each_example_once() {
        let dir = tempdir().unwrap();
        let mut session = session(dir.path());
        let mut out = Vec::new();

        run_demo(&mut session, DemoMode::Full, &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\nExample 1 - Mixed Emotions\n"));
        assert!(text.contains("\nAdditional Example - Worry & Stress\n"));
        assert!(!text.contains("Example 1: Example"));
    }

    #[tokio::test]
    async fn test_batch_demo_encrypts_before_decrypting() {
        let dir = tempdir().unwrap();
        let mut session = session(dir.path());
        let mut out = Vec::new();

        run_demo(&mut session, DemoMode::Batch, &mut out).await.unwrap();

        let operations: Vec<Operation> =
            session.history().iter().map(|record| record.operation).collect();
        assert_eq!(operations[..5], [Operation::Encrypt; 5]);
        assert_eq!(operations[5..], [Operation::Decrypt; 5]);
    }

    #[test]
    fn test_examples_fit_a_2048_bit_key() {
        for (_, message) in EXAMPLES {
            assert!(message.len() <= 190, "{message}");
        }
    }

    #[test]
    fn test_success_rate() {
        assert_eq!(DemoSummary { total: 0, successful: 0 }.success_rate(), 0.0);
        assert_eq!(DemoSummary { total: 5, successful: 4 }.success_rate(), 80.0);
    }
}
