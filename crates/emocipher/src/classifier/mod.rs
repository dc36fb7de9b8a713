//! Emotion classification backends.
//!
//! The processor only sees [`EmotionClassifier`]. The OpenAI client is one
//! implementation and tests substitute their own.

pub mod analysis;
pub mod openai;

pub use analysis::EmotionAnalysis;
pub use openai::{OpenAiClassifier, OpenAiConfig};

use crate::error::LabelUnavailable;

/// A label plus the structured analysis behind it, when the backend has one
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub analysis: Option<EmotionAnalysis>,
}

impl From<EmotionAnalysis> for Classification {
    fn from(analysis: EmotionAnalysis) -> Self {
        Self { label: analysis.label(), analysis: Some(analysis) }
    }
}

/// Something that can put a short emotion label on a piece of text
#[async_trait::async_trait]
pub trait EmotionClassifier: Send + Sync {
    /// Label `text`, e.g. `"Joy + Excitement"`
    async fn classify(&self, text: &str) -> Result<String, LabelUnavailable>;

    /// Label `text` and keep the full analysis. Backends that only produce
    /// a label get `analysis: None`.
    async fn classify_detailed(&self, text: &str) -> Result<Classification, LabelUnavailable> {
        let label = self.classify(text).await?;
        Ok(Classification { label, analysis: None })
    }

    /// Human readable backend name for status reports
    fn name(&self) -> String {
        "emotion classifier".to_string()
    }
}
