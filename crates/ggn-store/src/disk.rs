use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use ggn_crypto::StreamCipher;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::path::{check_namespace, relative_path, PathKey, PathTransform};
use crate::traits::{ContentStore, Presence};

/// Filesystem-backed content store.
///
/// On-disk layout:
/// ```text
/// <root>/<id>/<s1>/<s2>/.../<s8>/<digest>    content-addressed
/// <root>/<id>/<key>/<key>                    flat
/// ```
///
/// The store holds no mutable state; every call opens and releases its own
/// handles, except `read`, which hands its `File` to the caller.
pub struct DiskStore {
    config: StoreConfig,
    transform: Box<dyn PathTransform>,
}

impl DiskStore {
    /// Build a store using the transform selected by `config.layout`. An
    /// empty `config.root` becomes [`DEFAULT_ROOT`](crate::DEFAULT_ROOT).
    pub fn new(config: StoreConfig) -> Self {
        let config = config.with_default_root();
        let transform = config.path_transform();
        Self { config, transform }
    }

    /// Flat-layout store with default settings at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self::new(StoreConfig::new(root))
    }

    /// Build a store with a caller-supplied transform. `config.layout` and
    /// `config.shard_width` are ignored.
    pub fn with_transform(config: StoreConfig, transform: impl PathTransform + 'static) -> Self {
        Self {
            config: config.with_default_root(),
            transform: Box::new(transform),
        }
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Relative location of `key` under any namespace.
    pub fn path_key(&self, key: &str) -> PathKey {
        self.transform.transform(key)
    }

    /// Absolute file path of `key` under namespace `id`.
    pub fn full_path(&self, id: &str, key: &str) -> StoreResult<PathBuf> {
        let pk = self.path_key(key);
        Ok(self.namespace_dir(id)?.join(relative_path(&pk)?))
    }

    fn namespace_dir(&self, id: &str) -> StoreResult<PathBuf> {
        check_namespace(id)?;
        Ok(self.config.root.join(id))
    }

    /// Create the directory chain for `key` and create/truncate its file.
    fn open_for_writing(&self, id: &str, key: &str) -> StoreResult<(PathKey, File)> {
        let pk = self.path_key(key);
        let ns = self.namespace_dir(id)?;
        let file_path = ns.join(relative_path(&pk)?);
        fs::create_dir_all(ns.join(pk.dir_path_buf()))?;
        let file = File::create(&file_path)?;
        Ok((pk, file))
    }
}

impl ContentStore for DiskStore {
    type Reader = File;

    fn probe(&self, id: &str, key: &str) -> Presence {
        let Ok(path) = self.full_path(id, key) else {
            return Presence::Absent;
        };
        match fs::metadata(&path) {
            Ok(_) => Presence::Present,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Presence::Absent,
            Err(e) => Presence::Unknown(e.kind()),
        }
    }

    fn write<R: Read + ?Sized>(&self, id: &str, key: &str, source: &mut R) -> StoreResult<u64> {
        let (pk, mut file) = self.open_for_writing(id, key)?;
        let written = io::copy(source, &mut file)?;
        debug!(id, file = %pk.file_name, bytes = written, "wrote to disk");
        Ok(written)
    }

    fn write_decrypt<R: Read + ?Sized>(
        &self,
        enc_key: &[u8],
        id: &str,
        key: &str,
        source: &mut R,
    ) -> StoreResult<u64> {
        // Reject a bad key before the destination is truncated.
        let cipher = StreamCipher::new(enc_key)?.with_buffer_size(self.config.copy_buffer_size);
        let (pk, mut file) = self.open_for_writing(id, key)?;
        let written = cipher.decrypt(source, &mut file)?;
        debug!(id, file = %pk.file_name, bytes = written, "wrote decrypted stream to disk");
        Ok(written)
    }

    fn read(&self, id: &str, key: &str) -> StoreResult<(u64, File)> {
        let path = self.full_path(id, key)?;
        let file = File::open(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound { path: path.clone() },
            _ => StoreError::Io(e),
        })?;
        let size = file.metadata()?.len();
        debug!(id, path = %path.display(), bytes = size, "opened for reading");
        Ok((size, file))
    }

    fn delete_shard(&self, id: &str, key: &str) -> StoreResult<()> {
        let pk = self.path_key(key);
        let ns = self.namespace_dir(id)?;
        relative_path(&pk)?;

        // Without a directory part only the file itself can go; removing
        // `<root>/<id>/` would wipe the whole namespace.
        let target = match pk.first_segment() {
            "" => ns.join(&pk.file_name),
            first => ns.join(first),
        };
        let result = if target.is_dir() {
            fs::remove_dir_all(&target)
        } else {
            fs::remove_file(&target)
        };
        match result {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        info!(id, file = %pk.file_name, shard = %target.display(), "deleted from disk");
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        let root = &self.config.root;
        match fs::remove_dir_all(root) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound && !root_exists(root)? => {}
            Err(e) => return Err(e.into()),
        }
        info!(root = %self.config.root.display(), "cleared store");
        Ok(())
    }
}

fn root_exists(root: &Path) -> StoreResult<bool> {
    match fs::symlink_metadata(root) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

impl std::fmt::Debug for DiskStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiskStore")
            .field("root", &self.config.root)
            .field("layout", &self.config.layout)
            .finish()
    }
}
