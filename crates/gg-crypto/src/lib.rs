//! Login hash families and password zeroizing for the session protocol.
//!
//! Two hash families feed into a shared 64-byte challenge-response
//! buffer ([`compute_hash_buf`]): the legacy `GG32` fold and the modern
//! `SHA1` digest. [`Password`] gives the engine a buffer it can zero and
//! release the moment it's no longer needed.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod gg32;
mod login_hash;
mod password;
mod sha1_hash;

pub use gg32::gg32_hash;
pub use login_hash::{HASH_BUF_LEN, HashType, compute_hash_buf};
pub use password::Password;
pub use sha1_hash::{SHA1_DIGEST_LEN, sha1_hash};
