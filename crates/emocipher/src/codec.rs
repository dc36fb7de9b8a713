//! RSA-OAEP encryption of short messages.
//!
//! Padding is OAEP with SHA-256 for both the label hash and MGF1, and an
//! empty label. OAEP draws a fresh random seed per call, so encrypting the
//! same plaintext twice yields different ciphertexts.

use base64::{Engine, engine::general_purpose::STANDARD};
use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use crate::error::CipherError;

/// SHA-256 output length; OAEP spends two of these plus two bytes per block.
const HASH_LEN: usize = 32;

/// Largest plaintext, in bytes, that fits a single OAEP block for `key`
pub fn max_plaintext_len(key: &RsaPublicKey) -> usize {
    key.size().saturating_sub(2 * HASH_LEN + 2)
}

/// Fail with [`CipherError::PlaintextTooLong`] if `len` bytes would not fit
pub fn check_plaintext_len(len: usize, key: &RsaPublicKey) -> Result<(), CipherError> {
    let max = max_plaintext_len(key);
    if len > max {
        return Err(CipherError::PlaintextTooLong { len, max });
    }
    Ok(())
}

/// Encrypt `plaintext` for the holder of the private half of `key`
pub fn encrypt(plaintext: &[u8], key: &RsaPublicKey) -> Result<Vec<u8>, CipherError> {
    check_plaintext_len(plaintext.len(), key)?;

    key.encrypt(&mut OsRng, Oaep::new::<Sha256>(), plaintext).map_err(|e| match e {
        rsa::Error::MessageTooLong => {
            CipherError::PlaintextTooLong { len: plaintext.len(), max: max_plaintext_len(key) }
        }
        other => CipherError::Encryption(other.to_string()),
    })
}

/// Decrypt a ciphertext produced by [`encrypt`] with the matching public key
pub fn decrypt(ciphertext: &[u8], key: &RsaPrivateKey) -> Result<Vec<u8>, CipherError> {
    if ciphertext.len() != key.size() {
        return Err(CipherError::Decryption(format!(
            "ciphertext is {} bytes, expected {}",
            ciphertext.len(),
            key.size()
        )));
    }

    key.decrypt(Oaep::new::<Sha256>(), ciphertext)
        .map_err(|_| CipherError::Decryption("wrong key or corrupted ciphertext".to_string()))
}

/// Encrypt UTF-8 text and return the ciphertext as standard base64
pub fn encrypt_text(plaintext: &str, key: &RsaPublicKey) -> Result<String, CipherError> {
    encrypt(plaintext.as_bytes(), key).map(|ciphertext| STANDARD.encode(ciphertext))
}

/// Inverse of [`encrypt_text`]
pub fn decrypt_text(encoded: &str, key: &RsaPrivateKey) -> Result<String, CipherError> {
    let ciphertext = STANDARD
        .decode(encoded.trim())
        .map_err(|e| CipherError::Decryption(format!("ciphertext is not valid base64: {e}")))?;

    let plaintext = decrypt(&ciphertext, key)?;
    String::from_utf8(plaintext)
        .map_err(|_| CipherError::Decryption("plaintext is not valid UTF-8".to_string()))
}
