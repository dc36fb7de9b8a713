//! End-to-end tests with a persisted 2048-bit key pair

use std::fs;

use emocipher::{
    CipherError, ErrorKind, KeyStore, LabelRequest, MessageProcessor, RevealLabel, codec,
};
use tempfile::tempdir;

#[test]
fn test_2048_bit_store_roundtrip() {
    let _ = tracing_subscriber::fmt::try_init();
    let dir = tempdir().unwrap();
    let store = KeyStore::new(dir.path().join("keys"));

    let keys = store.ensure_key_pair().unwrap();
    assert_eq!(keys.bits(), 2048);
    assert_eq!(keys.max_plaintext_len(), 190);

    let private_pem = fs::read(store.private_key_path()).unwrap();
    let public_pem = fs::read(store.public_key_path()).unwrap();

    // Reloading must not regenerate
    let reloaded = store.ensure_key_pair().unwrap();
    assert_eq!(keys, reloaded);
    assert_eq!(private_pem, fs::read(store.private_key_path()).unwrap());
    assert_eq!(public_pem, fs::read(store.public_key_path()).unwrap());

    let message = "Feeling ecstatic about joining the new AI research team, though a bit anxious \
                   about the deadlines ahead.";
    let first = codec::encrypt_text(message, keys.public_key()).unwrap();
    let second = codec::encrypt_text(message, keys.public_key()).unwrap();
    assert_ne!(first, second);

    // A ciphertext made with the first load decrypts with the second
    assert_eq!(codec::decrypt_text(&first, reloaded.private_key()).unwrap(), message);
    assert_eq!(codec::decrypt_text(&second, reloaded.private_key()).unwrap(), message);

    let at_limit = "a".repeat(190);
    let encrypted = codec::encrypt_text(&at_limit, keys.public_key()).unwrap();
    assert_eq!(codec::decrypt_text(&encrypted, keys.private_key()).unwrap(), at_limit);

    let over_limit = "a".repeat(191);
    assert!(matches!(
        codec::encrypt_text(&over_limit, keys.public_key()),
        Err(CipherError::PlaintextTooLong { len: 191, max: 190 })
    ));
}

#[tokio::test]
async fn test_processor_over_persisted_keys() {
    let dir = tempdir().unwrap();
    let store = KeyStore::new(dir.path()).with_bits(1024);

    // Encrypt with one processor, decrypt with another built from the same files
    let sender = MessageProcessor::new(store.ensure_key_pair().unwrap());
    let receiver = MessageProcessor::new(store.ensure_key_pair().unwrap());

    let sent = sender.process("This encryption is very secure.", LabelRequest::Classify).await;
    assert!(sent.is_success());
    assert!(sent.emotion_label().unwrap().is_unavailable());

    let received = receiver
        .reveal(sent.encrypted_message().unwrap(), RevealLabel::Known("Calm".to_string()))
        .await;
    assert_eq!(received.original_message(), Some("This encryption is very secure."));

    let payload = serde_json::to_value(&received).unwrap();
    assert_eq!(payload["success"], true);
    assert_eq!(payload["emotionLabel"], "Calm");
    assert_eq!(payload["encryptedMessage"], sent.encrypted_message().unwrap());
}

#[tokio::test]
async fn test_foreign_key_cannot_reveal() {
    let dir = tempdir().unwrap();
    let alice = MessageProcessor::new(
        KeyStore::new(dir.path().join("alice")).with_bits(1024).ensure_key_pair().unwrap(),
    );
    let mallory = MessageProcessor::new(
        KeyStore::new(dir.path().join("mallory")).with_bits(1024).ensure_key_pair().unwrap(),
    );

    let sent = alice.process("for alice only", LabelRequest::Skip).await;
    let stolen = mallory.reveal(sent.encrypted_message().unwrap(), RevealLabel::None).await;

    assert_eq!(stolen.failure().unwrap().kind, ErrorKind::Decryption);
    assert!(stolen.original_message().is_none());
}
