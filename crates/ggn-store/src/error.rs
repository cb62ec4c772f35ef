use std::path::PathBuf;

use ggn_crypto::CipherError;

/// Errors from content store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No file at the computed path.
    #[error("not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// I/O error from the filesystem or a caller-supplied stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Decryption of an inbound stream failed (bad key or truncated IV).
    #[error("cipher error: {0}")]
    Cipher(#[source] CipherError),

    /// The namespace id or key would produce an unusable path.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Invalid or unreadable configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<CipherError> for StoreError {
    fn from(err: CipherError) -> Self {
        match err {
            CipherError::Io(e) => Self::Io(e),
            other => Self::Cipher(other),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
