//! Keyed name and content transforms
//!
//! One `Encrypter` is built per run and shared by reference with every pass.
//! Name generation is one-way (renamed identifiers are never mapped back);
//! content sealing is reversible so obfuscated programs can decode their
//! literals at run time.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of digest bytes that make up a generated identifier.
const NAME_DIGEST_BYTES: usize = 12;

/// Length of a randomly generated key.
pub const RANDOM_KEY_LEN: usize = 32;

const NAME_DOMAIN: u8 = 0x00;
const STREAM_DOMAIN: u8 = 0x01;

/// Deterministic keyed transform shared by all passes of one run.
#[derive(Clone)]
pub struct Encrypter {
    key: Vec<u8>,
}

impl std::fmt::Debug for Encrypter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Encrypter")
            .field("key_len", &self.key.len())
            .finish()
    }
}

impl Encrypter {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self { key: key.into() }
    }

    /// Build an encrypter from a fresh random key.
    pub fn random() -> Self {
        let mut key = vec![0u8; RANDOM_KEY_LEN];
        rand::thread_rng().fill_bytes(&mut key);
        Self { key }
    }

    /// Parse a user-supplied key. A `hex:` prefix selects hex decoding,
    /// anything else is taken as raw text.
    pub fn from_key_str(key: &str) -> crate::Result<Self> {
        match key.strip_prefix("hex:") {
            Some(encoded) => hex::decode(encoded)
                .map(Self::new)
                .map_err(|e| crate::ObfuscateError::ConfigError {
                    message: format!("invalid hex key: {}", e),
                }),
            None => Ok(Self::new(key.as_bytes())),
        }
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Map a name onto a replacement identifier.
    ///
    /// The output is always 24 ASCII letters. Digits of the hex digest are
    /// shifted onto `g..p`, and an uppercase first letter in the input keeps
    /// the output exported.
    pub fn encrypt(&self, name: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.key);
        hasher.update([NAME_DOMAIN]);
        hasher.update(name.as_bytes());
        let digest = hasher.finalize();

        let mut out: String = hex::encode(&digest[..NAME_DIGEST_BYTES])
            .chars()
            .map(|c| match c {
                '0'..='9' => (b'g' + (c as u8 - b'0')) as char,
                other => other,
            })
            .collect();

        if name.chars().next().is_some_and(char::is_uppercase) {
            out[..1].make_ascii_uppercase();
        }
        out
    }

    /// Encrypt every `/`-separated component of a package path.
    pub fn encrypt_components(&self, path: &str) -> String {
        path.split('/')
            .map(|comp| self.encrypt(comp))
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Keystream of `len` bytes for the given nonce.
    pub fn keystream(&self, nonce: &[u8], len: usize) -> Vec<u8> {
        let mut stream = Vec::with_capacity(len);
        let mut counter: u64 = 0;
        while stream.len() < len {
            let mut hasher = Sha256::new();
            hasher.update(&self.key);
            hasher.update([STREAM_DOMAIN]);
            hasher.update((nonce.len() as u64).to_le_bytes());
            hasher.update(nonce);
            hasher.update(counter.to_le_bytes());
            let block = hasher.finalize();
            let take = (len - stream.len()).min(block.len());
            stream.extend_from_slice(&block[..take]);
            counter += 1;
        }
        stream
    }

    /// Reversibly encode `plain` under (key, nonce).
    pub fn seal(&self, nonce: &[u8], plain: &[u8]) -> Vec<u8> {
        self.keystream(nonce, plain.len())
            .iter()
            .zip(plain)
            .map(|(k, p)| k ^ p)
            .collect()
    }

    /// Inverse of [`Encrypter::seal`].
    pub fn open(&self, nonce: &[u8], sealed: &[u8]) -> Vec<u8> {
        self.seal(nonce, sealed)
    }
}

/// True when `name` is a syntactically valid Go identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}
