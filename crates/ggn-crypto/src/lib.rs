//! Cryptographic primitives for ggnet.
//!
//! Provides the streaming AES-256-CTR transform used to move encrypted
//! content between peers, the key digests behind content addressing, and
//! random identifier/key generation.
//!
//! Randomness and hashing are exposed as capabilities ([`RandomSource`],
//! [`KeyDigest`]) so callers can inject deterministic fakes.
//!
//! All crypto operations wrap established RustCrypto implementations.

pub mod cipher;
pub mod hasher;
pub mod ids;
pub mod random;

pub use cipher::{
    copy_decrypt, copy_encrypt, CipherError, CipherResult, StreamCipher, DEFAULT_BUFFER_SIZE,
    IV_LEN, KEY_LEN,
};
pub use hasher::{KeyDigest, Md5Digest, Sha1Digest};
pub use ids::{generate_id, generate_id_with, hash_key, EncryptionKey, ID_BYTES};
pub use random::{RandomSource, SystemRandom};
