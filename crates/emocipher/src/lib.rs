//! Emotion Cipher - RSA-encrypted messages with emotion labels
//!
//! Messages are encrypted with RSA-OAEP under a persisted key pair, and
//! optionally labelled by an external emotion classifier. The label is
//! best-effort: it never stands in the way of encryption or decryption.

pub mod classifier;
pub mod codec;
pub mod error;
pub mod keys;
pub mod processor;
pub mod result;

// Re-export main types
pub use classifier::{Classification, EmotionAnalysis, EmotionClassifier, OpenAiClassifier, OpenAiConfig};
pub use error::{CipherError, ErrorKind, LabelUnavailable};
pub use keys::{KeyPair, KeyStore};
pub use processor::{LabelRequest, MessageProcessor, RevealLabel};
pub use result::{EmotionLabel, Failure, Processed, ProcessingResult};

/// Name of the encryption scheme, for status reports
pub const ALGORITHM: &str = "RSA-OAEP-SHA256";
