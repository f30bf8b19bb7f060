//! SHA-1 hash family: modern login challenge response.

use sha1::{Digest, Sha1};

/// Number of bytes SHA-1 produces; also the prefix length inside the
/// 64-byte wire hash field for this family.
pub const SHA1_DIGEST_LEN: usize = 20;

/// Compute the SHA-1 challenge response over `password || seed` (seed
/// little-endian), matching the modern hash family.
#[must_use]
pub fn sha1_hash(password: &[u8], seed: u32) -> [u8; SHA1_DIGEST_LEN] {
    let mut hasher = Sha1::new();
    hasher.update(password);
    hasher.update(seed.to_le_bytes());
    let digest = hasher.finalize();
    let mut out = [0u8; SHA1_DIGEST_LEN];
    out.copy_from_slice(&digest);
    out
}
