use serde::{Serialize, Serializer};

use crate::classifier::EmotionAnalysis;
use crate::error::{CipherError, ErrorKind, LabelUnavailable};

/// Emotion label attached to a processed message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmotionLabel {
    Detected(String),
    Unavailable(LabelUnavailable),
}

impl EmotionLabel {
    pub fn as_detected(&self) -> Option<&str> {
        match self {
            EmotionLabel::Detected(label) => Some(label),
            EmotionLabel::Unavailable(_) => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, EmotionLabel::Unavailable(_))
    }
}

impl std::fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmotionLabel::Detected(label) => write!(f, "{label}"),
            EmotionLabel::Unavailable(_) => write!(f, "Unavailable"),
        }
    }
}

/// A successfully encrypted or decrypted message
#[derive(Debug, Clone, PartialEq)]
pub struct Processed {
    pub original_message: String,
    /// Base64 RSA-OAEP ciphertext
    pub encrypted_message: String,
    /// `None` when no label was requested
    pub emotion_label: Option<EmotionLabel>,
    /// Present when the classifier returned a structured analysis
    pub emotion_analysis: Option<EmotionAnalysis>,
}

/// A failed encryption or decryption, with whatever input was known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
    pub original_message: Option<String>,
    pub encrypted_message: Option<String>,
}

impl Failure {
    pub fn new(error: &CipherError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
            original_message: None,
            encrypted_message: None,
        }
    }

    pub fn with_original(mut self, message: impl Into<String>) -> Self {
        self.original_message = Some(message.into());
        self
    }

    pub fn with_encrypted(mut self, message: impl Into<String>) -> Self {
        self.encrypted_message = Some(message.into());
        self
    }
}

/// Outcome of [`MessageProcessor::process`](crate::MessageProcessor::process)
/// or [`MessageProcessor::reveal`](crate::MessageProcessor::reveal).
///
/// Serializes to the flat payload
/// `originalMessage | encryptedMessage | emotionLabel? | labelStatus? | labelError? |
/// emotionAnalysis? | success | error? | errorKind?`.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingResult {
    Ok(Processed),
    Err(Failure),
}

impl ProcessingResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessingResult::Ok(_))
    }

    pub fn processed(&self) -> Option<&Processed> {
        match self {
            ProcessingResult::Ok(processed) => Some(processed),
            ProcessingResult::Err(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            ProcessingResult::Ok(_) => None,
            ProcessingResult::Err(failure) => Some(failure),
        }
    }

    pub fn original_message(&self) -> Option<&str> {
        match self {
            ProcessingResult::Ok(processed) => Some(&processed.original_message),
            ProcessingResult::Err(failure) => failure.original_message.as_deref(),
        }
    }

    pub fn encrypted_message(&self) -> Option<&str> {
        match self {
            ProcessingResult::Ok(processed) => Some(&processed.encrypted_message),
            ProcessingResult::Err(failure) => failure.encrypted_message.as_deref(),
        }
    }

    pub fn emotion_label(&self) -> Option<&EmotionLabel> {
        self.processed().and_then(|processed| processed.emotion_label.as_ref())
    }

    pub fn emotion_analysis(&self) -> Option<&EmotionAnalysis> {
        self.processed().and_then(|processed| processed.emotion_analysis.as_ref())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum LabelStatus {
    Detected,
    Unavailable,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Payload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    original_message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    encrypted_message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    emotion_label: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    label_status: Option<LabelStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    label_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    emotion_analysis: Option<&'a EmotionAnalysis>,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<ErrorKind>,
}

impl Serialize for ProcessingResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let payload = match self {
            ProcessingResult::Ok(processed) => {
                let label = processed.emotion_label.as_ref();
                Payload {
                    original_message: Some(&processed.original_message),
                    encrypted_message: Some(&processed.encrypted_message),
                    emotion_label: label.and_then(EmotionLabel::as_detected),
                    label_status: label.map(|label| match label {
                        EmotionLabel::Detected(_) => LabelStatus::Detected,
                        EmotionLabel::Unavailable(_) => LabelStatus::Unavailable,
                    }),
                    label_error: match label {
                        Some(EmotionLabel::Unavailable(reason)) => Some(reason.to_string()),
                        _ => None,
                    },
                    emotion_analysis: processed.emotion_analysis.as_ref(),
                    success: true,
                    error: None,
                    error_kind: None,
                }
            }
            ProcessingResult::Err(failure) => Payload {
                original_message: failure.original_message.as_deref(),
                encrypted_message: failure.encrypted_message.as_deref(),
                emotion_label: None,
                label_status: None,
                label_error: None,
                emotion_analysis: None,
                success: false,
                error: Some(&failure.message),
                error_kind: Some(failure.kind),
            },
        };
        payload.serialize(serializer)
    }
}
