//! Hash family selection and the fixed 64-byte challenge-response buffer.

use crate::gg32::gg32_hash;
use crate::sha1_hash::{SHA1_DIGEST_LEN, sha1_hash};

/// Size of the wire `hash` field carried in the login packet.
pub const HASH_BUF_LEN: usize = 64;

/// Selects which hashing scheme a session uses for its login challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashType {
    /// Legacy 32-bit fold hash.
    Gg32,
    /// Modern SHA-1 hash.
    Sha1,
}

/// Compute the 64-byte `hash_buf` sent in the login packet.
///
/// `GG32` places its 4-byte result at the front, zero-padded; `SHA1`
/// places its 20-byte digest at the front, zero-padded. The remainder is
/// always zero, never left uninitialized.
#[must_use]
pub fn compute_hash_buf(hash_type: HashType, password: &[u8], seed: u32) -> [u8; HASH_BUF_LEN] {
    let mut buf = [0u8; HASH_BUF_LEN];
    match hash_type {
        HashType::Gg32 => {
            let digest = gg32_hash(password, seed);
            buf[..4].copy_from_slice(&digest.to_le_bytes());
        },
        HashType::Sha1 => {
            let digest = sha1_hash(password, seed);
            buf[..SHA1_DIGEST_LEN].copy_from_slice(&digest);
        },
    }
    buf
}
