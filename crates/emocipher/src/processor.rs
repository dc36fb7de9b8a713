//! Label-then-encrypt and decrypt-then-relabel orchestration.
//!
//! A missing or failing classifier only degrades the label. The ciphertext
//! is always produced when the plaintext fits the key.

use std::sync::Arc;

use crate::classifier::{EmotionAnalysis, EmotionClassifier};
use crate::codec;
use crate::error::LabelUnavailable;
use crate::keys::KeyPair;
use crate::result::{EmotionLabel, Failure, Processed, ProcessingResult};

/// Whether [`MessageProcessor::process`] should ask for a label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelRequest {
    #[default]
    Classify,
    Skip,
}

/// What label, if any, [`MessageProcessor::reveal`] attaches
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RevealLabel {
    #[default]
    None,
    /// Re-attach a label the caller already has, e.g. from `process`
    Known(String),
    /// Ask the classifier again for the decrypted text
    Reclassify,
}

pub struct MessageProcessor {
    keys: Arc<KeyPair>,
    classifier: Option<Arc<dyn EmotionClassifier>>,
}

impl MessageProcessor {
    /// Processor without a classifier; every requested label is unavailable
    pub fn new(keys: impl Into<Arc<KeyPair>>) -> Self {
        Self { keys: keys.into(), classifier: None }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn EmotionClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn keys(&self) -> &KeyPair {
        &self.keys
    }

    pub fn classifier(&self) -> Option<&dyn EmotionClassifier> {
        self.classifier.as_deref()
    }

    /// Label `message` (if requested) and encrypt it.
    ///
    /// The length check runs first so an oversized message does not cost a
    /// classifier round trip.
    pub async fn process(&self, message: &str, label: LabelRequest) -> ProcessingResult {
        if let Err(error) = codec::check_plaintext_len(message.len(), self.keys.public_key()) {
            tracing::debug!("Rejecting message: {error}");
            return ProcessingResult::Err(Failure::new(&error).with_original(message));
        }

        let (emotion_label, emotion_analysis) = match label {
            LabelRequest::Classify => {
                let (label, analysis) = self.label(message).await;
                (Some(label), analysis)
            }
            LabelRequest::Skip => (None, None),
        };

        match codec::encrypt_text(message, self.keys.public_key()) {
            Ok(encrypted_message) => ProcessingResult::Ok(Processed {
                original_message: message.to_string(),
                encrypted_message,
                emotion_label,
                emotion_analysis,
            }),
            Err(error) => {
                tracing::warn!("Encryption failed: {error}");
                ProcessingResult::Err(Failure::new(&error).with_original(message))
            }
        }
    }

    /// Decrypt a base64 ciphertext produced by [`process`](Self::process)
    pub async fn reveal(&self, encrypted_message: &str, label: RevealLabel) -> ProcessingResult {
        let original_message = match codec::decrypt_text(encrypted_message, self.keys.private_key()) {
            Ok(plaintext) => plaintext,
            Err(error) => {
                tracing::warn!("Decryption failed: {error}");
                return ProcessingResult::Err(Failure::new(&error).with_encrypted(encrypted_message));
            }
        };

        let (emotion_label, emotion_analysis) = match label {
            RevealLabel::None => (None, None),
            RevealLabel::Known(known) => (Some(EmotionLabel::Detected(known)), None),
            RevealLabel::Reclassify => {
                let (label, analysis) = self.label(&original_message).await;
                (Some(label), analysis)
            }
        };

        ProcessingResult::Ok(Processed {
            original_message,
            encrypted_message: encrypted_message.trim().to_string(),
            emotion_label,
            emotion_analysis,
        })
    }

    /// Process each message in turn
    pub async fn process_batch<S: AsRef<str>>(
        &self,
        messages: &[S],
        label: LabelRequest,
    ) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(messages.len());
        for (i, message) in messages.iter().enumerate() {
            tracing::info!("Processing message {}/{}", i + 1, messages.len());
            results.push(self.process(message.as_ref(), label).await);
        }
        results
    }

    async fn label(&self, text: &str) -> (EmotionLabel, Option<EmotionAnalysis>) {
        let outcome = match &self.classifier {
            Some(classifier) => classifier.classify_detailed(text).await,
            None => Err(LabelUnavailable::NotConfigured),
        };

        match outcome {
            Ok(classification) => {
                (EmotionLabel::Detected(classification.label), classification.analysis)
            }
            Err(reason) => {
                tracing::warn!("Emotion label unavailable: {reason}");
                (EmotionLabel::Unavailable(reason), None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classification;
    use crate::error::ErrorKind;
    use crate::keys::generate_keypair;
    use std::sync::OnceLock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn keypair() -> Arc<KeyPair> {
        static KEYPAIR: OnceLock<Arc<KeyPair>> = OnceLock::new();
        KEYPAIR.get_or_init(|| Arc::new(generate_keypair(1024).unwrap())).clone()
    }

    /// Returns a fixed label and counts calls
    struct FixedClassifier {
        label: &'static str,
        calls: AtomicUsize,
    }

    impl FixedClassifier {
        fn new(label: &'static str) -> Arc<Self> {
            Arc::new(Self { label, calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait::async_trait]
    impl EmotionClassifier for FixedClassifier {
        async fn classify(&self, _text: &str) -> Result<String, LabelUnavailable> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.label.to_string())
        }
    }

    /// Backend that returns a structured analysis
    struct AnalyzingClassifier;

    #[async_trait::async_trait]
    impl EmotionClassifier for AnalyzingClassifier {
        async fn classify(&self, text: &str) -> Result<String, LabelUnavailable> {
            self.classify_detailed(text).await.map(|classification| classification.label)
        }

        async fn classify_detailed(&self, _text: &str) -> Result<Classification, LabelUnavailable> {
            Ok(Classification::from(EmotionAnalysis {
                primary_emotion: "fear".to_string(),
                secondary_emotions: vec!["worry".to_string()],
                intensity: Some(6.0),
                keywords: vec!["worried".to_string()],
                sentiment: Some("negative".to_string()),
                explanation: Some("Anticipatory anxiety".to_string()),
            }))
        }
    }

    struct FailingClassifier;

    #[async_trait::async_trait]
    impl EmotionClassifier for FailingClassifier {
        async fn classify(&self, _text: &str) -> Result<String, LabelUnavailable> {
            Err(LabelUnavailable::Request("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_process_attaches_label() {
        let classifier = FixedClassifier::new("Joy + Excitement");
        let processor = MessageProcessor::new(keypair()).with_classifier(classifier.clone());

        let result = processor.process("Finally got the job offer!", LabelRequest::Classify).await;

        let processed = result.processed().unwrap();
        assert_eq!(processed.original_message, "Finally got the job offer!");
        assert_eq!(
            processed.emotion_label,
            Some(EmotionLabel::Detected("Joy + Excitement".to_string()))
        );
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_process_carries_analysis_into_payload() {
        let processor = MessageProcessor::new(keypair()).with_classifier(Arc::new(AnalyzingClassifier));

        let result = processor.process("What if it goes wrong?", LabelRequest::Classify).await;
        assert_eq!(result.emotion_label().unwrap().as_detected(), Some("Fear + Worry"));
        assert_eq!(result.emotion_analysis().unwrap().intensity, Some(6.0));

        let payload = serde_json::to_value(&result).unwrap();
        assert_eq!(payload["emotionLabel"], "Fear + Worry");
        assert_eq!(payload["emotionAnalysis"]["sentiment"], "negative");
        assert_eq!(payload["emotionAnalysis"]["keywords"][0], "worried");

        let known = processor
            .reveal(result.encrypted_message().unwrap(), RevealLabel::Known("Fear + Worry".into()))
            .await;
        assert!(known.emotion_analysis().is_none());

        let relabelled =
            processor.reveal(result.encrypted_message().unwrap(), RevealLabel::Reclassify).await;
        assert_eq!(relabelled.emotion_analysis().unwrap().primary_emotion, "fear");
    }

    #[tokio::test]
    async fn test_label_only_classifier_has_no_analysis() {
        let processor = MessageProcessor::new(keypair()).with_classifier(FixedClassifier::new("Joy"));

        let result = processor.process("hello", LabelRequest::Classify).await;
        assert!(result.emotion_analysis().is_none());
        assert!(serde_json::to_value(&result).unwrap().get("emotionAnalysis").is_none());
    }

    #[tokio::test]
    async fn test_failing_classifier_does_not_block_encryption() {
        let processor = MessageProcessor::new(keypair()).with_classifier(Arc::new(FailingClassifier));

        let result = processor.process("I'm worried about tomorrow", LabelRequest::Classify).await;
        assert!(result.is_success());
        assert!(result.emotion_label().unwrap().is_unavailable());

        let revealed =
            processor.reveal(result.encrypted_message().unwrap(), RevealLabel::None).await;
        assert_eq!(revealed.original_message(), Some("I'm worried about tomorrow"));
    }

    #[tokio::test]
    async fn test_missing_classifier_marks_label_unavailable() {
        let processor = MessageProcessor::new(keypair());

        let result = processor.process("hello", LabelRequest::Classify).await;
        assert_eq!(
            result.emotion_label(),
            Some(&EmotionLabel::Unavailable(LabelUnavailable::NotConfigured))
        );
    }

    #[tokio::test]
    async fn test_skip_label_does_not_call_classifier() {
        let classifier = FixedClassifier::new("Joy");
        let processor = MessageProcessor::new(keypair()).with_classifier(classifier.clone());

        let result = processor.process("hello", LabelRequest::Skip).await;
        assert!(result.is_success());
        assert!(result.emotion_label().is_none());
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_oversized_message_fails_without_classifying() {
        let classifier = FixedClassifier::new("Joy");
        let processor = MessageProcessor::new(keypair()).with_classifier(classifier.clone());

        let message = "x".repeat(processor.keys().max_plaintext_len() + 1);
        let result = processor.process(&message, LabelRequest::Classify).await;

        let failure = result.failure().unwrap();
        assert_eq!(failure.kind, ErrorKind::PlaintextTooLong);
        assert_eq!(failure.original_message.as_deref(), Some(message.as_str()));
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reveal_label_modes() {
        let classifier = FixedClassifier::new("Sadness");
        let processor = MessageProcessor::new(keypair()).with_classifier(classifier.clone());
        let encrypted = processor.process("I failed that test again", LabelRequest::Skip).await;
        let encrypted = encrypted.encrypted_message().unwrap();

        let plain = processor.reveal(encrypted, RevealLabel::None).await;
        assert!(plain.emotion_label().is_none());

        let known = processor.reveal(encrypted, RevealLabel::Known("Frustration".into())).await;
        assert_eq!(known.emotion_label().unwrap().as_detected(), Some("Frustration"));
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);

        let relabelled = processor.reveal(encrypted, RevealLabel::Reclassify).await;
        assert_eq!(relabelled.emotion_label().unwrap().as_detected(), Some("Sadness"));
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reveal_reclassify_failure_still_decrypts() {
        let processor = MessageProcessor::new(keypair()).with_classifier(Arc::new(FailingClassifier));
        let encrypted = processor.process("secret", LabelRequest::Skip).await;

        let revealed = processor
            .reveal(encrypted.encrypted_message().unwrap(), RevealLabel::Reclassify)
            .await;
        assert_eq!(revealed.original_message(), Some("secret"));
        assert!(revealed.emotion_label().unwrap().is_unavailable());
    }

    #[tokio::test]
    async fn test_reveal_garbage_fails() {
        let processor = MessageProcessor::new(keypair());

        let result = processor.reveal("bm90IGEgY2lwaGVydGV4dA==", RevealLabel::Reclassify).await;
        let failure = result.failure().unwrap();
        assert_eq!(failure.kind, ErrorKind::Decryption);
        assert_eq!(failure.encrypted_message.as_deref(), Some("bm90IGEgY2lwaGVydGV4dA=="));
        assert!(result.original_message().is_none());
    }

    #[tokio::test]
    async fn test_process_batch_keeps_order() {
        let processor = MessageProcessor::new(keypair());
        let messages = ["one", "two", "three"];

        let results = processor.process_batch(&messages, LabelRequest::Skip).await;

        assert_eq!(results.len(), 3);
        for (message, result) in messages.iter().zip(&results) {
            assert_eq!(result.original_message(), Some(*message));
        }
    }
}
