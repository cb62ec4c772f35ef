use std::io::{self, Read, Write};

use aes::Aes256;
use ctr::cipher::{KeyIvInit, StreamCipher as _};
use tracing::debug;

use crate::random::{RandomSource, SystemRandom};

/// AES-256 with a 128-bit big-endian counter seeded by the IV.
type Aes256Ctr = ctr::Ctr128BE<Aes256>;

/// Key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// IV length in bytes, one AES block.
pub const IV_LEN: usize = 16;

/// Default size of the intermediate copy buffer (32 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 32 * 1024;

/// Errors from streaming encryption and decryption.
#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    /// The key is not exactly [`KEY_LEN`] bytes.
    #[error("invalid key length: {len} bytes (expected 32)")]
    InvalidKey { len: usize },

    /// The source ended before a full IV could be read.
    #[error("stream truncated: fewer than {expected} IV bytes available")]
    TruncatedStream { expected: usize },

    /// Read or write failure on one of the streams.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result alias for cipher operations.
pub type CipherResult<T> = Result<T, CipherError>;

/// Streaming AES-256-CTR transform with the IV carried inline.
///
/// Stream format:
/// ```text
/// [16 bytes: IV (plaintext)]
/// [N bytes: ciphertext, same length as the plaintext]
/// ```
///
/// Data moves through a single buffer of `buffer_size` bytes, so memory use
/// does not depend on stream length. There is no authentication tag: flipped
/// ciphertext bits flip the same plaintext bits and go unnoticed here.
#[derive(Clone)]
pub struct StreamCipher {
    key: [u8; KEY_LEN],
    buffer_size: usize,
}

impl StreamCipher {
    /// Create a cipher from raw key bytes. Fails unless `key` is 32 bytes.
    pub fn new(key: &[u8]) -> CipherResult<Self> {
        let key: [u8; KEY_LEN] = key
            .try_into()
            .map_err(|_| CipherError::InvalidKey { len: key.len() })?;
        Ok(Self {
            key,
            buffer_size: DEFAULT_BUFFER_SIZE,
        })
    }

    /// Use a different copy buffer size (clamped to at least one byte).
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    /// The copy buffer size in bytes.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Encrypt `src` into `dst` under a fresh random IV.
    ///
    /// Returns the number of bytes written to `dst`, IV included.
    pub fn encrypt<R, W>(&self, src: &mut R, dst: &mut W) -> CipherResult<u64>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        self.encrypt_with(&SystemRandom, src, dst)
    }

    /// Encrypt `src` into `dst`, drawing the IV from `rng`.
    pub fn encrypt_with<R, W>(
        &self,
        rng: &dyn RandomSource,
        src: &mut R,
        dst: &mut W,
    ) -> CipherResult<u64>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        let mut iv = [0u8; IV_LEN];
        rng.fill(&mut iv);
        dst.write_all(&iv)?;

        let mut keystream = self.keystream(&iv);
        let copied = self.copy_stream(&mut keystream, src, dst)?;
        debug!(bytes = copied, "encrypted stream");
        Ok(IV_LEN as u64 + copied)
    }

    /// Decrypt an IV-prefixed stream from `src` into `dst`.
    ///
    /// Returns the number of plaintext bytes written to `dst`.
    pub fn decrypt<R, W>(&self, src: &mut R, dst: &mut W) -> CipherResult<u64>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        let mut iv = [0u8; IV_LEN];
        src.read_exact(&mut iv).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => CipherError::TruncatedStream { expected: IV_LEN },
            _ => CipherError::Io(e),
        })?;

        let mut keystream = self.keystream(&iv);
        let copied = self.copy_stream(&mut keystream, src, dst)?;
        debug!(bytes = copied, "decrypted stream");
        Ok(copied)
    }

    fn keystream(&self, iv: &[u8; IV_LEN]) -> Aes256Ctr {
        Aes256Ctr::new(&self.key.into(), &(*iv).into())
    }

    fn copy_stream<R, W>(
        &self,
        keystream: &mut Aes256Ctr,
        src: &mut R,
        dst: &mut W,
    ) -> CipherResult<u64>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        let mut buf = vec![0u8; self.buffer_size];
        let mut written: u64 = 0;
        loop {
            let n = match src.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            keystream.apply_keystream(&mut buf[..n]);
            dst.write_all(&buf[..n])?;
            written += n as u64;
        }
        dst.flush()?;
        Ok(written)
    }
}

impl std::fmt::Debug for StreamCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamCipher")
            .field("key", &"<redacted>")
            .field("buffer_size", &self.buffer_size)
            .finish()
    }
}

/// One-shot encrypt of `src` into `dst` with `key`.
pub fn copy_encrypt<R, W>(key: &[u8], src: &mut R, dst: &mut W) -> CipherResult<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    StreamCipher::new(key)?.encrypt(src, dst)
}

/// One-shot decrypt of `src` into `dst` with `key`.
pub fn copy_decrypt<R, W>(key: &[u8], src: &mut R, dst: &mut W) -> CipherResult<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    StreamCipher::new(key)?.decrypt(src, dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Hands out a fixed IV.
    struct FixedIv([u8; IV_LEN]);

    impl RandomSource for FixedIv {
        fn fill(&self, dest: &mut [u8]) {
            dest.copy_from_slice(&self.0[..dest.len()]);
        }
    }

    /// Reader that fails with `Interrupted` once, then behaves normally.
    struct InterruptOnce<R> {
        inner: R,
        interrupted: bool,
    }

    impl<R: Read> Read for InterruptOnce<R> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::Error::new(io::ErrorKind::Interrupted, "signal"));
            }
            self.inner.read(buf)
        }
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer went away"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn key() -> [u8; KEY_LEN] {
        [0x42; KEY_LEN]
    }

    fn encrypt_vec(cipher: &StreamCipher, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        cipher.encrypt(&mut &data[..], &mut out).unwrap();
        out
    }

    fn decrypt_vec(cipher: &StreamCipher, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        cipher.decrypt(&mut &data[..], &mut out).unwrap();
        out
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let cipher = StreamCipher::new(&key()).unwrap();
        let plaintext = b"some file contents worth keeping private";
        let ciphertext = encrypt_vec(&cipher, plaintext);
        assert_ne!(&ciphertext[IV_LEN..], &plaintext[..]);
        assert_eq!(decrypt_vec(&cipher, &ciphertext), plaintext);
    }

    #[test]
    fn empty_stream_roundtrip() {
        let cipher = StreamCipher::new(&key()).unwrap();
        let ciphertext = encrypt_vec(&cipher, b"");
        assert_eq!(ciphertext.len(), IV_LEN);
        assert!(decrypt_vec(&cipher, &ciphertext).is_empty());
    }

    #[test]
    fn byte_counts() {
        let cipher = StreamCipher::new(&key()).unwrap();
        let plaintext = vec![9u8; 1000];
        let mut ciphertext = Vec::new();
        let written = cipher.encrypt(&mut &plaintext[..], &mut ciphertext).unwrap();
        assert_eq!(written, (IV_LEN + 1000) as u64);
        assert_eq!(ciphertext.len(), IV_LEN + 1000);

        let mut out = Vec::new();
        let written = cipher.decrypt(&mut &ciphertext[..], &mut out).unwrap();
        assert_eq!(written, 1000);
    }

    #[test]
    fn stream_larger_than_buffer() {
        let cipher = StreamCipher::new(&key()).unwrap().with_buffer_size(7);
        let plaintext: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        let ciphertext = encrypt_vec(&cipher, &plaintext);
        assert_eq!(decrypt_vec(&cipher, &ciphertext), plaintext);

        // Chunking must not change the keystream.
        let big = StreamCipher::new(&key()).unwrap();
        assert_eq!(decrypt_vec(&big, &ciphertext), plaintext);
    }

    #[test]
    fn iv_is_written_in_the_clear() {
        let iv = [0x11; IV_LEN];
        let cipher = StreamCipher::new(&key()).unwrap();
        let mut out = Vec::new();
        cipher
            .encrypt_with(&FixedIv(iv), &mut &b"payload"[..], &mut out)
            .unwrap();
        assert_eq!(&out[..IV_LEN], &iv);
    }

    #[test]
    fn fresh_iv_per_encryption() {
        let cipher = StreamCipher::new(&key()).unwrap();
        let a = encrypt_vec(&cipher, b"same");
        let b = encrypt_vec(&cipher, b"same");
        assert_ne!(a[..IV_LEN], b[..IV_LEN]);
        assert_ne!(a, b);
    }

    #[test]
    fn matches_nist_ctr_aes256_vector() {
        // NIST SP 800-38A, F.5.5 CTR-AES256.Encrypt, block 1.
        let key =
            hex::decode("603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4")
                .unwrap();
        let iv: [u8; IV_LEN] = hex::decode("f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff")
            .unwrap()
            .try_into()
            .unwrap();
        let plaintext = hex::decode("6bc1bee22e409f96e93d7e117393172a").unwrap();

        let cipher = StreamCipher::new(&key).unwrap();
        let mut out = Vec::new();
        cipher
            .encrypt_with(&FixedIv(iv), &mut &plaintext[..], &mut out)
            .unwrap();
        assert_eq!(hex::encode(&out[IV_LEN..]), "601ec313775789a5b7a7f504bbf3d228");
    }

    #[test]
    fn invalid_key_lengths_rejected() {
        for len in [0usize, 16, 24, 31, 33, 64] {
            let err = StreamCipher::new(&vec![0u8; len]).unwrap_err();
            assert!(matches!(err, CipherError::InvalidKey { len: l } if l == len));
        }
    }

    #[test]
    fn truncated_iv_is_reported() {
        let cipher = StreamCipher::new(&key()).unwrap();
        let mut out = Vec::new();
        let err = cipher.decrypt(&mut &[0u8; IV_LEN - 1][..], &mut out).unwrap_err();
        assert!(matches!(err, CipherError::TruncatedStream { expected: IV_LEN }));
        assert!(out.is_empty());

        let err = cipher.decrypt(&mut &[0u8; 0][..], &mut out).unwrap_err();
        assert!(matches!(err, CipherError::TruncatedStream { .. }));
    }

    #[test]
    fn wrong_key_yields_garbage_of_same_length() {
        let cipher = StreamCipher::new(&key()).unwrap();
        let other = StreamCipher::new(&[0x24; KEY_LEN]).unwrap();
        let plaintext = b"attack at dawn";
        let ciphertext = encrypt_vec(&cipher, plaintext);
        let garbage = decrypt_vec(&other, &ciphertext);
        assert_eq!(garbage.len(), plaintext.len());
        assert_ne!(garbage, plaintext);
    }

    #[test]
    fn bit_flip_goes_undetected() {
        let cipher = StreamCipher::new(&key()).unwrap();
        let plaintext = b"transfer 100 coins".to_vec();
        let mut ciphertext = encrypt_vec(&cipher, &plaintext);
        ciphertext[IV_LEN + 9] ^= 0x01;

        let tampered = decrypt_vec(&cipher, &ciphertext);
        let diffs: Vec<usize> = (0..plaintext.len())
            .filter(|i| tampered[*i] != plaintext[*i])
            .collect();
        assert_eq!(diffs, vec![9]);
    }

    #[test]
    fn interrupted_reads_are_retried() {
        let cipher = StreamCipher::new(&key()).unwrap();
        let plaintext = b"interrupted".to_vec();
        let mut src = InterruptOnce {
            inner: &plaintext[..],
            interrupted: false,
        };
        let mut ciphertext = Vec::new();
        cipher.encrypt(&mut src, &mut ciphertext).unwrap();
        assert_eq!(decrypt_vec(&cipher, &ciphertext), plaintext);
    }

    #[test]
    fn write_failure_aborts() {
        let cipher = StreamCipher::new(&key()).unwrap();
        let err = cipher
            .encrypt(&mut &b"data"[..], &mut FailingWriter)
            .unwrap_err();
        match err {
            CipherError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("expected Io, got {other:?}"),
        }
    }

    #[test]
    fn one_shot_helpers() {
        let mut ciphertext = Vec::new();
        copy_encrypt(&key(), &mut &b"helper"[..], &mut ciphertext).unwrap();
        let mut plaintext = Vec::new();
        copy_decrypt(&key(), &mut &ciphertext[..], &mut plaintext).unwrap();
        assert_eq!(plaintext, b"helper");

        let err = copy_encrypt(&[1, 2, 3], &mut &b"x"[..], &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CipherError::InvalidKey { len: 3 }));
    }

    #[test]
    fn zero_buffer_size_is_clamped() {
        let cipher = StreamCipher::new(&key()).unwrap().with_buffer_size(0);
        assert_eq!(cipher.buffer_size(), 1);
        let ciphertext = encrypt_vec(&cipher, b"tiny buffer");
        assert_eq!(decrypt_vec(&cipher, &ciphertext), b"tiny buffer");
    }

    #[test]
    fn debug_redacts_key() {
        let cipher = StreamCipher::new(&key()).unwrap();
        assert!(format!("{cipher:?}").contains("redacted"));
    }

    proptest! {
        #[test]
        fn roundtrip_any_bytes(
            data in proptest::collection::vec(any::<u8>(), 0..4096),
            key in proptest::array::uniform32(any::<u8>()),
            buffer_size in 1usize..512,
        ) {
            let cipher = StreamCipher::new(&key).unwrap().with_buffer_size(buffer_size);
            let ciphertext = encrypt_vec(&cipher, &data);
            prop_assert_eq!(ciphertext.len(), IV_LEN + data.len());
            prop_assert_eq!(decrypt_vec(&cipher, &ciphertext), data);
        }
    }
}
