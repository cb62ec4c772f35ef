use md5::Md5;
use sha1::{Digest, Sha1};

/// A hash function used to turn keys into fixed-width fingerprints.
///
/// The store asks for a digest capability instead of calling a hash
/// function directly, so tests can substitute a deterministic fake and
/// deployments can pick a different width.
pub trait KeyDigest: Send + Sync {
    /// Raw digest bytes of `data`.
    fn digest(&self, data: &[u8]) -> Vec<u8>;

    /// Digest length in bytes.
    fn output_len(&self) -> usize;

    /// Lowercase hex encoding of the digest (`2 * output_len()` characters).
    fn hex_digest(&self, data: &[u8]) -> String {
        hex::encode(self.digest(data))
    }
}

/// SHA-1 (160 bit). Used for content addressing.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha1Digest;

impl KeyDigest for Sha1Digest {
    fn digest(&self, data: &[u8]) -> Vec<u8> {
        Sha1::digest(data).to_vec()
    }

    fn output_len(&self) -> usize {
        20
    }
}

/// MD5 (128 bit).
///
/// Fast, but offers no collision resistance against an adversary. Only fit
/// for cache keys and similar lookups, never for content addressing.
#[derive(Clone, Copy, Debug, Default)]
pub struct Md5Digest;

impl KeyDigest for Md5Digest {
    fn digest(&self, data: &[u8]) -> Vec<u8> {
        Md5::digest(data).to_vec()
    }

    fn output_len(&self) -> usize {
        16
    }
}

impl<D: KeyDigest + ?Sized> KeyDigest for Box<D> {
    fn digest(&self, data: &[u8]) -> Vec<u8> {
        (**self).digest(data)
    }

    fn output_len(&self) -> usize {
        (**self).output_len()
    }
}
