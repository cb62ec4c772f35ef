use crate::cipher::KEY_LEN;
use crate::hasher::{KeyDigest, Md5Digest};
use crate::random::{RandomSource, SystemRandom};

/// Number of random bytes behind a generated identifier.
pub const ID_BYTES: usize = 32;

/// Generate a random identifier (64 hex characters) for peers or sessions.
pub fn generate_id() -> String {
    generate_id_with(&SystemRandom)
}

/// Generate a random identifier from the given source.
pub fn generate_id_with(rng: &dyn RandomSource) -> String {
    let mut buf = [0u8; ID_BYTES];
    rng.fill(&mut buf);
    hex::encode(buf)
}

/// Fast, non-cryptographic hash of a key, hex encoded (32 characters).
///
/// Suitable for cache keys and lookups. Not collision resistant against an
/// adversary, so it must not replace the content-addressing digest.
pub fn hash_key(key: &str) -> String {
    Md5Digest.hex_digest(key.as_bytes())
}

/// A raw 256-bit symmetric key for [`StreamCipher`](crate::StreamCipher).
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey([u8; KEY_LEN]);

impl EncryptionKey {
    /// Generate a fresh random key from the system CSPRNG.
    pub fn generate() -> Self {
        Self::generate_with(&SystemRandom)
    }

    /// Generate a key from the given random source.
    pub fn generate_with(rng: &dyn RandomSource) -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rng.fill(&mut bytes);
        Self(bytes)
    }

    /// Create from raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl AsRef<[u8]> for EncryptionKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EncryptionKey(<redacted>)")
    }
}
