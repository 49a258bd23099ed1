//! Trait-based provider mechanism for the digest primitive.
//!
//! The DRBG core never names a concrete hash function; it drives whatever
//! engine the caller injects through these traits. This replaces the C-style
//! function pointer table of the reference design with Rust's trait system.

use hashrand_types::CryptoError;

/// A hash / message digest algorithm.
///
/// The contract mirrors what the DRBG derivation functions need: a context
/// that can absorb data in multiple `update` calls, be finalized into a
/// digest of a known fixed size, and be restarted for a fresh message at any
/// time via `reset`.
pub trait Digest: Send + Sync {
    /// The digest output size in bytes.
    fn output_size(&self) -> usize;

    /// Feed data into the hash state.
    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError>;

    /// Finalize the hash and write the digest to `out`.
    /// The length of `out` must be at least `output_size()`.
    fn finish(&mut self, out: &mut [u8]) -> Result<(), CryptoError>;

    /// Restart the hash state to process a new message.
    fn reset(&mut self);
}

/// A convenience wrapper trait for creating digest instances.
pub trait HashAlgorithm: Send + Sync {
    /// Create a new digest context.
    fn new_digest(&self) -> Box<dyn Digest>;

    /// One-shot hash computation.
    fn hash(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut ctx = self.new_digest();
        ctx.update(data)?;
        let mut out = vec![0u8; ctx.output_size()];
        ctx.finish(&mut out)?;
        Ok(out)
    }
}
