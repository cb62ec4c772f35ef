use std::fmt;
use std::path::{Component, Path, PathBuf};

use ggn_crypto::{KeyDigest, Sha1Digest};

use crate::error::{StoreError, StoreResult};

/// Default number of hex characters per shard directory.
pub const DEFAULT_SHARD_WIDTH: usize = 5;

/// Relative on-disk location of a key, derived on demand and never stored.
///
/// For content-addressed layouts `file_name` is the full hex digest and
/// `path_name` splits that digest into fixed-width segments joined by `/`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathKey {
    /// Directory part, `/`-separated.
    pub path_name: String,
    /// File name inside `path_name`.
    pub file_name: String,
}

impl PathKey {
    pub fn new(path_name: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            path_name: path_name.into(),
            file_name: file_name.into(),
        }
    }

    /// Directory components of `path_name`.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path_name.split('/').filter(|s| !s.is_empty())
    }

    /// The top-level directory. This is the unit removed by shard deletion.
    pub fn first_segment(&self) -> &str {
        self.segments().next().unwrap_or("")
    }

    /// `path_name/file_name`.
    pub fn full_path(&self) -> String {
        format!("{}/{}", self.path_name, self.file_name)
    }

    /// Directory part as a `PathBuf`, built one component at a time.
    pub fn dir_path_buf(&self) -> PathBuf {
        self.segments().collect()
    }

    /// Full relative path as a `PathBuf`.
    pub fn to_path_buf(&self) -> PathBuf {
        let mut path = self.dir_path_buf();
        path.push(&self.file_name);
        path
    }
}

/// Reject namespace ids that are empty, absolute or climb out with `..`.
pub(crate) fn check_namespace(id: &str) -> StoreResult<()> {
    if !is_plain_relative(Path::new(id)) {
        return Err(StoreError::InvalidPath(format!("namespace id {id:?}")));
    }
    Ok(())
}

/// Relative path of `pk`, rejecting anything that could leave the namespace.
pub(crate) fn relative_path(pk: &PathKey) -> StoreResult<PathBuf> {
    let path = pk.to_path_buf();
    if pk.file_name.is_empty() || !is_plain_relative(&path) {
        return Err(StoreError::InvalidPath(format!("key path {:?}", pk.full_path())));
    }
    Ok(path)
}

/// Non-empty and made only of normal components (no root, `.` or `..`).
fn is_plain_relative(path: &Path) -> bool {
    let mut components = path.components().peekable();
    components.peek().is_some() && components.all(|c| matches!(c, Component::Normal(_)))
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}

/// Maps a logical key to its relative storage location.
///
/// Implementations must be pure: the same key always yields the same
/// [`PathKey`]. Plain functions and closures of the right shape qualify.
pub trait PathTransform: Send + Sync {
    fn transform(&self, key: &str) -> PathKey;
}

impl<F> PathTransform for F
where
    F: Fn(&str) -> PathKey + Send + Sync,
{
    fn transform(&self, key: &str) -> PathKey {
        self(key)
    }
}

/// Content-addressed layout: hash the key, shard the hex digest.
///
/// With SHA-1 and the default width the key `"hello"` lands at
/// `aaf4c/61ddc/c5e8a/2dabe/de0f3/b482c/d9aea/9434d/aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d`.
/// Eight directory levels keep per-directory entry counts small however
/// many objects are stored. A digest whose hex length is not a multiple of
/// the width loses its trailing partial chunk from `path_name`; `file_name`
/// always carries the whole digest.
pub struct CasPathTransform {
    digest: Box<dyn KeyDigest>,
    shard_width: usize,
}

impl CasPathTransform {
    /// SHA-1 digest, [`DEFAULT_SHARD_WIDTH`] characters per segment.
    pub fn new() -> Self {
        Self::with_digest(Sha1Digest, DEFAULT_SHARD_WIDTH)
    }

    /// Custom digest and segment width (clamped to at least 1).
    pub fn with_digest(digest: impl KeyDigest + 'static, shard_width: usize) -> Self {
        Self {
            digest: Box::new(digest),
            shard_width: shard_width.max(1),
        }
    }

    pub fn shard_width(&self) -> usize {
        self.shard_width
    }
}

impl Default for CasPathTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl PathTransform for CasPathTransform {
    fn transform(&self, key: &str) -> PathKey {
        let hash = self.digest.hex_digest(key.as_bytes());
        let width = self.shard_width;
        let segments: Vec<&str> = (0..hash.len() / width)
            .map(|i| &hash[i * width..(i + 1) * width])
            .collect();

        PathKey {
            path_name: segments.join("/"),
            file_name: hash,
        }
    }
}

impl fmt::Debug for CasPathTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CasPathTransform")
            .field("digest_len", &self.digest.output_len())
            .field("shard_width", &self.shard_width)
            .finish()
    }
}

/// Flat layout: the key is used verbatim as both directory and file name.
///
/// Human readable, but one directory per key under the namespace.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlatPathTransform;

impl PathTransform for FlatPathTransform {
    fn transform(&self, key: &str) -> PathKey {
        PathKey::new(key, key)
    }
}

/// Content-addressed transform with the default digest and width.
pub fn cas_path_transform(key: &str) -> PathKey {
    CasPathTransform::new().transform(key)
}

/// Identity transform.
pub fn flat_path_transform(key: &str) -> PathKey {
    FlatPathTransform.transform(key)
}
