use std::collections::HashMap;
use std::ffi::OsStr;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use ggn_crypto::StreamCipher;

use crate::error::{StoreError, StoreResult};
use crate::path::{check_namespace, relative_path, FlatPathTransform, PathKey, PathTransform};
use crate::traits::{ContentStore, Presence};

/// Entries keyed by namespace id, then by the key's relative path.
type Entries = HashMap<String, HashMap<PathBuf, Vec<u8>>>;

/// In-memory, HashMap-based content store.
///
/// Intended for tests and embedding. Mirrors [`DiskStore`](crate::DiskStore)
/// semantics without touching the filesystem: the same id and key checks,
/// shard-wide deletion, and partial content left behind by a failed write.
/// Entries are cloned on read.
pub struct InMemoryContentStore {
    transform: Box<dyn PathTransform>,
    entries: RwLock<Entries>,
}

impl InMemoryContentStore {
    /// Create an empty store using the default flat transform.
    pub fn new() -> Self {
        Self::with_transform(FlatPathTransform)
    }

    pub fn with_transform(transform: impl PathTransform + 'static) -> Self {
        Self {
            transform: Box::new(transform),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of entries across all namespaces.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .expect("lock poisoned")
            .values()
            .map(HashMap::len)
            .sum()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total bytes across all entries.
    pub fn total_bytes(&self) -> u64 {
        self.entries
            .read()
            .expect("lock poisoned")
            .values()
            .flat_map(HashMap::values)
            .map(|data| data.len() as u64)
            .sum()
    }

    /// Validated relative path of `key` under namespace `id`.
    fn locate(&self, id: &str, key: &str) -> StoreResult<(PathKey, PathBuf)> {
        check_namespace(id)?;
        let pk = self.transform.transform(key);
        let rel = relative_path(&pk)?;
        Ok((pk, rel))
    }

    fn insert(&self, id: &str, rel: PathBuf, data: Vec<u8>) {
        let mut map = self.entries.write().expect("lock poisoned");
        map.entry(id.to_string()).or_default().insert(rel, data);
    }
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentStore for InMemoryContentStore {
    type Reader = Cursor<Vec<u8>>;

    fn probe(&self, id: &str, key: &str) -> Presence {
        let Ok((_, rel)) = self.locate(id, key) else {
            return Presence::Absent;
        };
        let map = self.entries.read().expect("lock poisoned");
        match map.get(id).and_then(|ns| ns.get(&rel)) {
            Some(_) => Presence::Present,
            None => Presence::Absent,
        }
    }

    fn write<R: Read + ?Sized>(&self, id: &str, key: &str, source: &mut R) -> StoreResult<u64> {
        let (_, rel) = self.locate(id, key)?;
        let mut data = Vec::new();
        let result = source.read_to_end(&mut data);
        self.insert(id, rel, data);
        Ok(result? as u64)
    }

    fn write_decrypt<R: Read + ?Sized>(
        &self,
        enc_key: &[u8],
        id: &str,
        key: &str,
        source: &mut R,
    ) -> StoreResult<u64> {
        let cipher = StreamCipher::new(enc_key)?;
        let (_, rel) = self.locate(id, key)?;
        let mut data = Vec::new();
        let result = cipher.decrypt(source, &mut data);
        self.insert(id, rel, data);
        Ok(result?)
    }

    fn read(&self, id: &str, key: &str) -> StoreResult<(u64, Cursor<Vec<u8>>)> {
        let (_, rel) = self.locate(id, key)?;
        let map = self.entries.read().expect("lock poisoned");
        let data = map
            .get(id)
            .and_then(|ns| ns.get(&rel))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                path: Path::new(id).join(&rel),
            })?;
        Ok((data.len() as u64, Cursor::new(data)))
    }

    fn delete_shard(&self, id: &str, key: &str) -> StoreResult<()> {
        let (pk, rel) = self.locate(id, key)?;
        let mut map = self.entries.write().expect("lock poisoned");
        if let Some(ns) = map.get_mut(id) {
            match pk.first_segment() {
                "" => {
                    ns.remove(&rel);
                }
                first => {
                    let first = OsStr::new(first);
                    ns.retain(|path, _| path.iter().next() != Some(first));
                }
            }
        }
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        self.entries.write().expect("lock poisoned").clear();
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryContentStore")
            .field("entry_count", &self.len())
            .finish()
    }
}
