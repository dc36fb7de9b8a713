// Output formatting helpers

use std::fmt::Display;
use std::io::{self, Write};

use emocipher::{EmotionAnalysis, ProcessingResult};
use serde::Serialize;

const RULE: &str = "============================================================";

pub fn print_json<T: Serialize>(data: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    println!("{json}");
    Ok(())
}

pub fn rule(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{RULE}")
}

pub fn success(out: &mut impl Write, message: impl Display) -> io::Result<()> {
    writeln!(out, "✓ {message}")
}

pub fn failure(out: &mut impl Write, message: impl Display) -> io::Result<()> {
    writeln!(out, "✗ {message}")
}

/// Shorten a ciphertext for display, keeping the full value in results
pub fn truncate(s: &str, max_len: usize) -> String {
    match s.char_indices().nth(max_len) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

fn label_text(result: &ProcessingResult) -> String {
    result.emotion_label().map_or_else(|| "Not requested".to_string(), ToString::to_string)
}

/// Intensity, sentiment and keywords under the label, when the classifier
/// returned an analysis
pub fn analysis_details(out: &mut impl Write, analysis: Option<&EmotionAnalysis>) -> io::Result<()> {
    let Some(analysis) = analysis else {
        return Ok(());
    };
    if let Some(intensity) = analysis.intensity {
        writeln!(out, "  Intensity: {intensity}/10")?;
    }
    if let Some(sentiment) = &analysis.sentiment {
        writeln!(out, "  Sentiment: {sentiment}")?;
    }
    if !analysis.keywords.is_empty() {
        writeln!(out, "  Keywords: {}", analysis.keywords.join(", "))?;
    }
    Ok(())
}

/// The "Input / Encrypted Output" half of a round trip
pub fn encrypted_block(out: &mut impl Write, message: &str, result: &ProcessingResult) -> io::Result<()> {
    writeln!(out, "\nInput:\n{message:?}\n")?;
    match result {
        ProcessingResult::Ok(processed) => {
            writeln!(out, "Encrypted Output:")?;
            writeln!(out, "Encrypted Text: {:?}", truncate(&processed.encrypted_message, 16))?;
            writeln!(out, "Detected Emotion: {}", label_text(result))?;
            analysis_details(out, result.emotion_analysis())?;
            writeln!(out)
        }
        ProcessingResult::Err(failed) => failure(out, format_args!("Encryption failed: {}", failed.message)),
    }
}

/// The "Decrypted Output" half of a round trip
pub fn decrypted_block(out: &mut impl Write, result: &ProcessingResult) -> io::Result<()> {
    match result {
        ProcessingResult::Ok(processed) => {
            writeln!(out, "Decrypted Output:")?;
            writeln!(out, "Original Message: {:?}", processed.original_message)?;
            writeln!(out, "Detected Emotion: {}", label_text(result))?;
            analysis_details(out, result.emotion_analysis())
        }
        ProcessingResult::Err(failed) => failure(out, format_args!("Decryption failed: {}", failed.message)),
    }
}
