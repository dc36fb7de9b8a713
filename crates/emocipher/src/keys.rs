//! RSA key pair generation and PEM persistence.
//!
//! A [`KeyStore`] owns two file paths: a PKCS#8 private key and a
//! SubjectPublicKeyInfo public key. [`KeyStore::ensure_key_pair`] loads them
//! when present and generates a fresh pair otherwise. A key file that exists
//! but cannot be parsed is an error, never a reason to regenerate.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rand::rngs::OsRng;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

use crate::codec;
use crate::error::CipherError;

pub const DEFAULT_KEY_BITS: usize = 2048;
pub const MIN_KEY_BITS: usize = 1024;
pub const PRIVATE_KEY_FILE: &str = "private_key.pem";
pub const PUBLIC_KEY_FILE: &str = "public_key.pem";

/// Placeholder path for errors about keys that never touched the disk
const IN_MEMORY: &str = "<memory>";

/// RSA key pair. The public half is always derived from, and consistent
/// with, the private half.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("bits", &self.bits())
            .field("fingerprint", &self.fingerprint())
            .finish_non_exhaustive()
    }
}

impl KeyPair {
    /// Create a keypair from a private key
    pub fn new(private_key: RsaPrivateKey) -> Self {
        let public_key = RsaPublicKey::from(&private_key);
        Self { private_key, public_key }
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    /// Modulus size in bits
    pub fn bits(&self) -> usize {
        self.public_key.size() * 8
    }

    /// Largest plaintext this key can encrypt in one block
    pub fn max_plaintext_len(&self) -> usize {
        codec::max_plaintext_len(&self.public_key)
    }

    /// Hex SHA-256 of the DER-encoded public key
    pub fn fingerprint(&self) -> String {
        match self.public_key.to_public_key_der() {
            Ok(der) => hex::encode(Sha256::digest(der.as_bytes())),
            Err(_) => String::new(),
        }
    }

    /// Public key as SubjectPublicKeyInfo PEM
    pub fn public_key_pem(&self) -> Result<String, CipherError> {
        self.public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CipherError::key_generation(IN_MEMORY, e))
    }
}

/// Generate a new RSA key pair of `bits` bits
pub fn generate_keypair(bits: usize) -> Result<KeyPair, CipherError> {
    if bits < MIN_KEY_BITS {
        return Err(CipherError::key_generation(
            IN_MEMORY,
            format!("{bits}-bit keys are too small, use at least {MIN_KEY_BITS}"),
        ));
    }
    let private_key =
        RsaPrivateKey::new(&mut OsRng, bits).map_err(|e| CipherError::key_generation(IN_MEMORY, e))?;
    Ok(KeyPair::new(private_key))
}

/// On-disk home of a single key pair.
#[derive(Debug, Clone)]
pub struct KeyStore {
    private_key_path: PathBuf,
    public_key_path: PathBuf,
    bits: usize,
}

impl KeyStore {
    /// Key store using the default file names inside `dir`
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::with_paths(dir.join(PRIVATE_KEY_FILE), dir.join(PUBLIC_KEY_FILE))
    }

    pub fn with_paths(private_key_path: impl Into<PathBuf>, public_key_path: impl Into<PathBuf>) -> Self {
        Self {
            private_key_path: private_key_path.into(),
            public_key_path: public_key_path.into(),
            bits: DEFAULT_KEY_BITS,
        }
    }

    /// Key size used when a new pair has to be generated
    pub fn with_bits(mut self, bits: usize) -> Self {
        self.bits = bits;
        self
    }

    pub fn private_key_path(&self) -> &Path {
        &self.private_key_path
    }

    pub fn public_key_path(&self) -> &Path {
        &self.public_key_path
    }

    pub fn bits(&self) -> usize {
        self.bits
    }

    /// Whether both key files are present
    pub fn exists(&self) -> bool {
        self.private_key_path.exists() && self.public_key_path.exists()
    }

    /// Load the persisted key pair, generating and saving one if neither
    /// file exists yet.
    ///
    /// A missing public key is re-derived from the private key. A missing
    /// private key next to an existing public key is a load error, since
    /// generating would orphan whatever was encrypted for that public key.
    pub fn ensure_key_pair(&self) -> Result<KeyPair, CipherError> {
        match (self.private_key_path.exists(), self.public_key_path.exists()) {
            (true, true) => {
                tracing::info!("Loading existing key pair from: {}", self.private_key_path.display());
                self.load()
            }
            (true, false) => {
                tracing::warn!(
                    "Public key missing, re-deriving it into: {}",
                    self.public_key_path.display()
                );
                let keypair = KeyPair::new(load_private_key(&self.private_key_path)?);
                self.write_public_key(&keypair)?;
                Ok(keypair)
            }
            (false, true) => Err(CipherError::key_load(
                &self.private_key_path,
                "private key file is missing but its public key exists",
            )),
            (false, false) => {
                tracing::info!(
                    "Generating new {}-bit key pair in: {}",
                    self.bits,
                    self.private_key_path.display()
                );
                let keypair = generate_keypair(self.bits).map_err(|e| match e {
                    CipherError::KeyGeneration { reason, .. } => {
                        CipherError::key_generation(&self.private_key_path, reason)
                    }
                    other => other,
                })?;
                self.save(&keypair)?;
                Ok(keypair)
            }
        }
    }

    /// Load both halves and check that they belong together
    pub fn load(&self) -> Result<KeyPair, CipherError> {
        let keypair = KeyPair::new(load_private_key(&self.private_key_path)?);
        let public_key = load_public_key(&self.public_key_path)?;

        if public_key != keypair.public_key {
            return Err(CipherError::key_load(
                &self.public_key_path,
                "public key does not match the private key",
            ));
        }
        Ok(keypair)
    }

    /// Write both halves, creating the parent directories
    pub fn save(&self, keypair: &KeyPair) -> Result<(), CipherError> {
        let pem = keypair
            .private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| CipherError::key_generation(&self.private_key_path, e))?;

        create_parent(&self.private_key_path)?;
        write_private(&self.private_key_path, pem.as_bytes())
            .map_err(|e| CipherError::key_generation(&self.private_key_path, e))?;
        self.write_public_key(keypair)?;

        tracing::info!(
            "Saved key pair to: {} and {}",
            self.private_key_path.display(),
            self.public_key_path.display()
        );
        Ok(())
    }

    fn write_public_key(&self, keypair: &KeyPair) -> Result<(), CipherError> {
        let pem = keypair
            .public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CipherError::key_generation(&self.public_key_path, e))?;

        create_parent(&self.public_key_path)?;
        fs::write(&self.public_key_path, pem)
            .map_err(|e| CipherError::key_generation(&self.public_key_path, e))
    }
}

fn create_parent(path: &Path) -> Result<(), CipherError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| CipherError::key_generation(path, e))?;
    }
    Ok(())
}

/// Accepts PKCS#8 and, for keys made by other tools, PKCS#1 PEM.
fn load_private_key(path: &Path) -> Result<RsaPrivateKey, CipherError> {
    let pem = fs::read_to_string(path).map_err(|e| CipherError::key_load(path, e))?;

    RsaPrivateKey::from_pkcs8_pem(&pem)
        .or_else(|pkcs8_err| {
            RsaPrivateKey::from_pkcs1_pem(&pem).map_err(|_| pkcs8_err)
        })
        .map_err(|e| CipherError::key_load(path, e))
}

fn load_public_key(path: &Path) -> Result<RsaPublicKey, CipherError> {
    let pem = fs::read_to_string(path).map_err(|e| CipherError::key_load(path, e))?;
    RsaPublicKey::from_public_key_pem(&pem).map_err(|e| CipherError::key_load(path, e))
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    fs::write(path, contents)
}
