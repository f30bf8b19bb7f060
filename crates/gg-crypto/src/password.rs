//! A password buffer that can be explicitly zeroized on consumption.

use zeroize::Zeroize;

/// Owned, zeroable password bytes.
///
/// `clear()` overwrites the buffer with zeros and empties it immediately
/// (for sessions configured to clear the password right after hashing);
/// `Drop` always zeroizes whatever bytes remain, so a session that never
/// calls `clear()` explicitly still never leaks the password into freed
/// memory unzeroed.
pub struct Password {
    bytes: Vec<u8>,
    cleared: bool,
}

impl Password {
    /// Take ownership of password bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes, cleared: false }
    }

    /// Borrow the password bytes. Empty once [`Self::clear`] has run.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Overwrite the buffer with zeros and drop its contents.
    pub fn clear(&mut self) {
        self.bytes.zeroize();
        self.cleared = true;
    }

    /// Whether [`Self::clear`] has already run.
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.cleared
    }
}

impl Drop for Password {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_zeroes_and_empties_buffer() {
        let mut password = Password::new(b"hunter2".to_vec());
        password.clear();
        assert!(password.as_bytes().is_empty());
        assert!(password.is_cleared());
    }

    #[test]
    fn uncleared_password_retains_bytes_until_drop() {
        let password = Password::new(b"hunter2".to_vec());
        assert_eq!(password.as_bytes(), b"hunter2");
        assert!(!password.is_cleared());
    }
}
