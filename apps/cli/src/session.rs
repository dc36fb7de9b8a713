//! A processing session: one processor plus a history of what it did.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use emocipher::{
    ALGORITHM, LabelRequest, MessageProcessor, OpenAiClassifier, ProcessingResult, RevealLabel,
};
use serde::Serialize;

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Encrypt,
    Decrypt,
}

/// Bookkeeping for one processed message. Holds sizes only, never content.
#[derive(Debug, Clone, Serialize)]
pub struct CipherRecord {
    pub timestamp: DateTime<Utc>,
    pub operation: Operation,
    pub message_length: usize,
    pub encrypted_length: usize,
    pub has_emotion_label: bool,
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub encryption: EncryptionStatus,
    pub emotion_analysis: ClassifierStatus,
    pub statistics: Statistics,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct EncryptionStatus {
    pub keys_ready: bool,
    pub algorithm: String,
    pub padding: &'static str,
    pub fingerprint: String,
    pub max_plaintext_bytes: usize,
}

#[derive(Debug, Serialize)]
pub struct ClassifierStatus {
    pub available: bool,
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub total_operations: usize,
    pub successful_operations: usize,
    pub failed_operations: usize,
}

#[derive(Serialize)]
struct ExportInfo {
    timestamp: DateTime<Utc>,
    system_version: &'static str,
}

#[derive(Serialize)]
struct Export<'a> {
    export_info: ExportInfo,
    system_status: SystemStatus,
    cipher_history: &'a [CipherRecord],
}

pub struct Session {
    processor: MessageProcessor,
    history: Vec<CipherRecord>,
}

impl Session {
    pub fn new(processor: MessageProcessor) -> Self {
        Self { processor, history: Vec::new() }
    }

    /// Load or create the configured keys and attach the OpenAI classifier
    /// when an API key is available
    pub fn open(config: &Config, api_key: Option<&str>) -> Result<Self> {
        let store = config.keys.store();
        let keys = store.ensure_key_pair().context("Failed to set up encryption keys")?;
        let mut processor = MessageProcessor::new(keys);

        match api_key.and_then(|key| config.classifier.openai(key)) {
            Some(openai) => match OpenAiClassifier::new(openai) {
                Ok(classifier) => processor = processor.with_classifier(Arc::new(classifier)),
                Err(e) => tracing::warn!("OpenAI integration failed, continuing without labels: {e}"),
            },
            None if !config.classifier.enabled => {
                tracing::info!("Emotion classification disabled in config")
            }
            None => tracing::info!(
                "No OpenAI API key provided. Emotion analysis will not be available."
            ),
        }

        Ok(Self::new(processor))
    }

    pub fn processor(&self) -> &MessageProcessor {
        &self.processor
    }

    pub fn history(&self) -> &[CipherRecord] {
        &self.history
    }

    pub async fn encrypt(&mut self, message: &str, label: LabelRequest) -> ProcessingResult {
        let result = self.processor.process(message, label).await;
        self.record(Operation::Encrypt, message.len(), &result);
        result
    }

    pub async fn decrypt(&mut self, encrypted: &str, label: RevealLabel) -> ProcessingResult {
        let result = self.processor.reveal(encrypted, label).await;
        self.record(Operation::Decrypt, result.original_message().map_or(0, str::len), &result);
        result
    }

    /// Encrypt every message in order, recording each one
    pub async fn encrypt_batch(&mut self, messages: &[&str], label: LabelRequest) -> Vec<ProcessingResult> {
        let results = self.processor.process_batch(messages, label).await;
        for (message, result) in messages.iter().zip(&results) {
            self.record(Operation::Encrypt, message.len(), result);
        }
        results
    }

    /// Encrypt with a label, then decrypt re-attaching that label
    pub async fn round_trip(&mut self, message: &str) -> (ProcessingResult, Option<ProcessingResult>) {
        let encrypted = self.encrypt(message, LabelRequest::Classify).await;

        let Some(processed) = encrypted.processed() else {
            return (encrypted, None);
        };
        let label = match processed.emotion_label.as_ref().and_then(|l| l.as_detected()) {
            Some(label) => RevealLabel::Known(label.to_string()),
            None => RevealLabel::None,
        };
        let ciphertext = processed.encrypted_message.clone();

        let decrypted = self.decrypt(&ciphertext, label).await;
        (encrypted, Some(decrypted))
    }

    fn record(&mut self, operation: Operation, message_length: usize, result: &ProcessingResult) {
        self.history.push(CipherRecord {
            timestamp: Utc::now(),
            operation,
            message_length,
            encrypted_length: result.encrypted_message().map_or(0, str::len),
            has_emotion_label: result
                .emotion_label()
                .is_some_and(|label| label.as_detected().is_some()),
            success: result.is_success(),
        });
    }

    pub fn statistics(&self) -> Statistics {
        let successful = self.history.iter().filter(|record| record.success).count();
        Statistics {
            total_operations: self.history.len(),
            successful_operations: successful,
            failed_operations: self.history.len() - successful,
        }
    }

    pub fn status(&self) -> SystemStatus {
        let keys = self.processor.keys();
        let classifier = self.processor.classifier();

        SystemStatus {
            encryption: EncryptionStatus {
                keys_ready: true,
                algorithm: format!("RSA-{}", keys.bits()),
                padding: ALGORITHM,
                fingerprint: keys.fingerprint(),
                max_plaintext_bytes: keys.max_plaintext_len(),
            },
            emotion_analysis: ClassifierStatus {
                available: classifier.is_some(),
                provider: classifier.map(|c| c.name()),
            },
            statistics: self.statistics(),
            timestamp: Utc::now(),
        }
    }

    /// Write status and history as pretty JSON
    pub fn export(&self, path: &Path) -> Result<()> {
        let export = Export {
            export_info: ExportInfo {
                timestamp: Utc::now(),
                system_version: env!("CARGO_PKG_VERSION"),
            },
            system_status: self.status(),
            cipher_history: &self.history,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&export)?;
        fs::write(path, json).with_context(|| format!("Failed to export to {}", path.display()))?;

        tracing::info!("Data exported to {}", path.display());
        Ok(())
    }
}
