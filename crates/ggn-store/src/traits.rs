use std::io::{self, Read};

use crate::error::StoreResult;

/// Outcome of a presence check that keeps I/O failures visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presence {
    Present,
    Absent,
    /// The check itself failed for a reason other than "not found".
    Unknown(io::ErrorKind),
}

impl Presence {
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present)
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Namespaced key/stream store.
///
/// Every entry is addressed by a namespace `id` (the owning node) and a
/// logical `key`. Implementations must satisfy:
/// - Entries under different ids never collide, even for equal keys.
/// - `write` to an existing id/key overwrites it.
/// - `delete` removes the whole first-level shard holding the key, which
///   takes every other key sharing that shard with it.
/// - No locking: concurrent writers to the same id/key are not serialized.
/// - All I/O errors are propagated; only `has` collapses them.
pub trait ContentStore: Send + Sync {
    /// Owned handle returned by `read`. Released when dropped.
    type Reader: Read;

    /// Three-valued presence check.
    fn probe(&self, id: &str, key: &str) -> Presence;

    /// `true` unless the entry is known to be absent.
    ///
    /// A check that fails for any reason other than "not found" (for
    /// example permission denied) reports `true`. Use [`probe`](Self::probe)
    /// to tell the two apart.
    fn has(&self, id: &str, key: &str) -> bool {
        !self.probe(id, key).is_absent()
    }

    /// Copy `source` into the entry unmodified. Returns bytes written.
    fn write<R: Read + ?Sized>(&self, id: &str, key: &str, source: &mut R) -> StoreResult<u64>;

    /// Decrypt an IV-prefixed ciphertext stream with `enc_key` and store the
    /// plaintext. Returns plaintext bytes written.
    fn write_decrypt<R: Read + ?Sized>(
        &self,
        enc_key: &[u8],
        id: &str,
        key: &str,
        source: &mut R,
    ) -> StoreResult<u64>;

    /// Open an entry. Returns its size and a readable handle.
    fn read(&self, id: &str, key: &str) -> StoreResult<(u64, Self::Reader)>;

    /// Remove the first-level shard containing `key` under `id`.
    fn delete_shard(&self, id: &str, key: &str) -> StoreResult<()>;

    /// Remove `key`, along with every other key in the same first-level
    /// shard. Equivalent to [`delete_shard`](Self::delete_shard).
    fn delete(&self, id: &str, key: &str) -> StoreResult<()> {
        self.delete_shard(id, key)
    }

    /// Remove everything, across all namespaces.
    fn clear(&self) -> StoreResult<()>;
}
