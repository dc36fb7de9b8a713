use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Failures of the key store and the cipher codec.
#[derive(Debug, Error)]
pub enum CipherError {
    #[error("Failed to generate key pair at {path}: {reason}")]
    KeyGeneration { path: PathBuf, reason: String },
    #[error("Failed to load key from {path}: {reason}")]
    KeyLoad { path: PathBuf, reason: String },
    #[error("Plaintext is {len} bytes, the key accepts at most {max}")]
    PlaintextTooLong { len: usize, max: usize },
    #[error("Encryption failed: {0}")]
    Encryption(String),
    #[error("Decryption failed: {0}")]
    Decryption(String),
}

impl CipherError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CipherError::KeyGeneration { .. } => ErrorKind::KeyGeneration,
            CipherError::KeyLoad { .. } => ErrorKind::KeyLoad,
            CipherError::PlaintextTooLong { .. } => ErrorKind::PlaintextTooLong,
            CipherError::Encryption(_) => ErrorKind::Encryption,
            CipherError::Decryption(_) => ErrorKind::Decryption,
        }
    }

    pub(crate) fn key_generation(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        CipherError::KeyGeneration { path: path.into(), reason: reason.to_string() }
    }

    pub(crate) fn key_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        CipherError::KeyLoad { path: path.into(), reason: reason.to_string() }
    }
}

/// Discriminant of a [`CipherError`], carried by failed results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    KeyGeneration,
    KeyLoad,
    PlaintextTooLong,
    Encryption,
    Decryption,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::KeyGeneration => write!(f, "key_generation"),
            ErrorKind::KeyLoad => write!(f, "key_load"),
            ErrorKind::PlaintextTooLong => write!(f, "plaintext_too_long"),
            ErrorKind::Encryption => write!(f, "encryption"),
            ErrorKind::Decryption => write!(f, "decryption"),
        }
    }
}

/// Why no emotion label could be produced.
///
/// Never fatal: the processor records it on the result and carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelUnavailable {
    #[error("no emotion classifier is configured")]
    NotConfigured,
    #[error("classifier request failed: {0}")]
    Request(String),
    #[error("classifier returned HTTP {0}")]
    Status(u16),
    #[error("classifier response could not be understood: {0}")]
    MalformedResponse(String),
}
