use std::path::{Path, PathBuf};

use ggn_crypto::DEFAULT_BUFFER_SIZE;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::path::{CasPathTransform, FlatPathTransform, PathTransform, DEFAULT_SHARD_WIDTH};

/// Root directory used when none is configured.
pub const DEFAULT_ROOT: &str = "ggnetwork";

/// How keys are laid out under a namespace directory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathLayout {
    /// SHA-1 of the key, sharded into `shard_width`-character directories.
    ContentAddressed,
    /// The key itself as directory and file name.
    #[default]
    Flat,
}

/// Store configuration. Fixed once the store is built.
///
/// ```toml
/// root = "/var/lib/ggnet"
/// layout = "content-addressed"   # default "flat"
/// shard_width = 5
/// copy_buffer_size = 32768
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub root: PathBuf,
    pub layout: PathLayout,
    pub shard_width: usize,
    pub copy_buffer_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            layout: PathLayout::default(),
            shard_width: DEFAULT_SHARD_WIDTH,
            copy_buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl StoreConfig {
    /// Default configuration rooted at `root`. An empty root becomes
    /// [`DEFAULT_ROOT`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
        .with_default_root()
    }

    /// Replace an empty `root` with [`DEFAULT_ROOT`].
    pub fn with_default_root(mut self) -> Self {
        if self.root.as_os_str().is_empty() {
            self.root = PathBuf::from(DEFAULT_ROOT);
        }
        self
    }

    pub fn with_layout(mut self, layout: PathLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_shard_width(mut self, shard_width: usize) -> Self {
        self.shard_width = shard_width;
        self
    }

    pub fn with_copy_buffer_size(mut self, copy_buffer_size: usize) -> Self {
        self.copy_buffer_size = copy_buffer_size;
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> StoreResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| StoreError::Config(e.to_string()))?;
        config.validate()
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Check value ranges. An empty root falls back to [`DEFAULT_ROOT`].
    pub fn validate(self) -> StoreResult<Self> {
        let config = self.with_default_root();
        if config.shard_width == 0 {
            return Err(StoreError::Config("shard_width must be at least 1".into()));
        }
        if config.copy_buffer_size == 0 {
            return Err(StoreError::Config("copy_buffer_size must be at least 1".into()));
        }
        Ok(config)
    }

    /// Build the path transform selected by `layout`.
    pub fn path_transform(&self) -> Box<dyn PathTransform> {
        match self.layout {
            PathLayout::ContentAddressed => Box::new(CasPathTransform::with_digest(
                ggn_crypto::Sha1Digest,
                self.shard_width,
            )),
            PathLayout::Flat => Box::new(FlatPathTransform),
        }
    }
}
