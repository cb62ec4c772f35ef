//! Namespaced content-addressed storage for ggnet nodes.
//!
//! Every entry is addressed by a namespace id (the owning node) and a
//! logical key. A [`PathTransform`] maps the key to a relative location. The
//! default [`FlatPathTransform`] uses the key as both directory and file
//! name; [`CasPathTransform`], selected with
//! [`PathLayout::ContentAddressed`], hashes it with SHA-1 and shards the hex
//! digest into eight five-character directory levels:
//!
//! ```text
//! <root>/<id>/hello/hello
//! <root>/<id>/aaf4c/61ddc/c5e8a/2dabe/de0f3/b482c/d9aea/9434d/<digest>
//! ```
//!
//! # Storage Backends
//!
//! All backends implement the [`ContentStore`] trait:
//!
//! - [`DiskStore`] -- the filesystem store used by a running node
//! - [`InMemoryContentStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Paths are recomputed from the key on every call, never cached.
//! 2. Writing an existing id/key overwrites it.
//! 3. `delete` removes the whole first-level shard, not just one key.
//! 4. `write_decrypt` stores plaintext from an IV-prefixed AES-256-CTR stream.
//! 5. No locking: callers coordinate concurrent writers to the same key.
//! 6. All I/O errors are propagated; `has` is the only call that folds
//!    them into its answer (see [`Presence`] for the three-valued form).
//! 7. A failed write may leave a partial file behind; no cleanup is attempted.

pub mod config;
pub mod disk;
pub mod error;
pub mod memory;
pub mod path;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use config::{PathLayout, StoreConfig, DEFAULT_ROOT};
pub use disk::DiskStore;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryContentStore;
pub use path::{
    cas_path_transform, flat_path_transform, CasPathTransform, FlatPathTransform, PathKey,
    PathTransform, DEFAULT_SHARD_WIDTH,
};
pub use traits::{ContentStore, Presence};
