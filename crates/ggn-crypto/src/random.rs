use rand::RngCore;

/// Source of cryptographically secure random bytes.
///
/// IVs, identifiers and encryption keys all draw from a `RandomSource`.
/// Production code uses [`SystemRandom`]; tests can plug in a fixed source.
pub trait RandomSource: Send + Sync {
    /// Fill `dest` entirely with random bytes.
    fn fill(&self, dest: &mut [u8]);
}

/// The process-wide CSPRNG (`rand::thread_rng`), safe to share across threads.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRandom;

impl RandomSource for SystemRandom {
    fn fill(&self, dest: &mut [u8]) {
        rand::thread_rng().fill_bytes(dest);
    }
}
